use std::sync::Arc;

use crate::catalog::{Catalog, MatchCandidate};
use crate::dates::{format_short, parse_day_month, Clock, SystemClock};
use crate::domain::{DeliveryType, PaymentType};
use crate::errors::StepError;
use crate::flows::states::{
    ChoiceData, ChoiceKind, ChoiceOption, Command, Completion, DialogueStep, Keyboard, Reply,
    TurnOutcome, UserAction, CONFIRM_CANCEL, CONFIRM_GENERATE, MENU_BUTTON,
};
use crate::render::{
    build_document_fields, output_file_name, DocumentRenderer, RenderedDocument, TemplateId,
};
use crate::session::{PendingSelection, Session};

const MENU_PROMPT: &str = "Нажмите кнопку, чтобы начать формирование допсоглашения.";
const USE_MENU_BUTTON: &str = "Используйте кнопку 'Создать допсоглашение'.";
const COMPANY_PROMPT: &str =
    "Введите компанию и номер допсоглашения через запятую, например: сиб, 12";
const COMPANY_FORMAT_HINT: &str = "Введите: компания, номер допсоглашения. Пример: сиб, 12";
const AGREEMENT_NUMBER_PROMPT: &str = "Номер допсоглашения:";
const PAYMENT_PROMPT: &str = "Выберите тип оплаты:";
const DELIVERY_PROMPT: &str = "Выберите тип поставки:";
const CURRENT_DATE_PROMPT: &str = "Дата допсоглашения (ДД.ММ или ДД.ММ.ГГГГ):";
const DELIVERY_DATE_PROMPT: &str = "Дата поставки:";
const PAY_DATE_PROMPT: &str = "Дата оплаты:";
const PRODUCT_PROMPT: &str = "Продукт (ключ или название):";
const TONS_PROMPT: &str = "Количество тонн:";
const PRICE_PROMPT: &str = "Цена:";
const LOCATION_PROMPT: &str = "Базис погрузки (ключ или название локации):";
const UNLOAD_ADDRESS_PROMPT: &str = "Адрес слива:";
const INVALID_DATE: &str = "Неверная дата. Используйте формат ДД.ММ или ДД.ММ.ГГГГ.";
const GENERATE_LABEL: &str = "Сгенерировать";
const CANCEL_LABEL: &str = "Отмена";
const DONE_TEXT: &str = "Готово. Документ сформирован и отправлен.";
const ANOTHER_ONE_TEXT: &str = "Создать ещё один документ?";
const CONFIRM_CANCELLED_TEXT: &str = "Операция отменена. Можете сразу создать новый документ.";
const DIALOGUE_CANCELLED_TEXT: &str = "Диалог отменён. Можно сразу создать новый документ.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lookup {
    Company,
    Product,
    Location,
}

impl Lookup {
    fn input_step(self) -> DialogueStep {
        match self {
            Self::Company => DialogueStep::CompanyInput,
            Self::Product => DialogueStep::ProductInput,
            Self::Location => DialogueStep::LocationInput,
        }
    }

    fn select_step(self) -> DialogueStep {
        match self {
            Self::Company => DialogueStep::CompanySelect,
            Self::Product => DialogueStep::ProductSelect,
            Self::Location => DialogueStep::LocationSelect,
        }
    }

    fn choice_kind(self) -> ChoiceKind {
        match self {
            Self::Company => ChoiceKind::Company,
            Self::Product => ChoiceKind::Product,
            Self::Location => ChoiceKind::Location,
        }
    }

    fn not_found(self) -> &'static str {
        match self {
            Self::Company => {
                "Компания не найдена. Повторите ввод: компания, номер допсоглашения."
            }
            Self::Product => "Продукт не найден. Введите ключ/название ещё раз.",
            Self::Location => "Локация не найдена. Введите ключ/название ещё раз.",
        }
    }

    fn several_found(self) -> &'static str {
        match self {
            Self::Company => "Найдено несколько компаний. Выберите нужную:",
            Self::Product => "Найдено несколько продуктов. Выберите нужный:",
            Self::Location => "Найдено несколько локаций. Выберите нужную:",
        }
    }

    fn invalid_choice(self) -> &'static str {
        match self {
            Self::Company => "Некорректный выбор. Введите компанию заново.",
            Self::Product => "Некорректный выбор. Введите продукт заново.",
            Self::Location => "Некорректный выбор. Введите локацию заново.",
        }
    }

    fn vanished(self) -> &'static str {
        match self {
            Self::Company => "Компания не найдена. Введите компанию заново.",
            Self::Product => "Ключ продукта не найден. Введите продукт заново.",
            Self::Location => "Ключ локации не найден. Введите локацию заново.",
        }
    }
}

#[derive(Default)]
struct Turn {
    replies: Vec<Reply>,
    completion: Option<Completion>,
}

impl Turn {
    fn push(&mut self, reply: Reply) {
        self.replies.push(reply);
    }
}

/// Drives one chat through the agreement form. Every call consumes exactly
/// one action and leaves the session in a valid step.
pub struct DialogueEngine {
    catalog: Arc<Catalog>,
    renderer: Arc<dyn DocumentRenderer>,
    clock: Arc<dyn Clock>,
}

impl DialogueEngine {
    pub fn new(
        catalog: Arc<Catalog>,
        renderer: Arc<dyn DocumentRenderer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { catalog, renderer, clock }
    }

    pub fn with_system_clock(catalog: Arc<Catalog>, renderer: Arc<dyn DocumentRenderer>) -> Self {
        Self::new(catalog, renderer, Arc::new(SystemClock))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn handle(&self, session: &mut Session, action: &UserAction) -> TurnOutcome {
        let from = session.step;
        let mut turn = Turn::default();

        let error = match self.dispatch(session, action, &mut turn) {
            Ok(()) => None,
            Err(error) => {
                self.report_error(session, action, &error, &mut turn);
                Some(error)
            }
        };

        TurnOutcome {
            from,
            to: session.step,
            replies: turn.replies,
            completion: turn.completion,
            error,
        }
    }

    fn dispatch(
        &self,
        session: &mut Session,
        action: &UserAction,
        turn: &mut Turn,
    ) -> Result<(), StepError> {
        use DialogueStep::{
            AgreementNumber, CompanyInput, CompanySelect, Confirm, CurrentDate, DeliveryDate,
            LocationInput, LocationSelect, MenuConfirm, PayDate, Price, ProductInput,
            ProductSelect, Start, Tons, UnloadAddress,
        };
        use UserAction::{Choice, Text};

        match (session.step, action) {
            (_, UserAction::Command(Command::Cancel)) => {
                session.reset();
                turn.completion = Some(Completion::Cancelled);
                turn.push(menu_reply(DIALOGUE_CANCELLED_TEXT));
                Ok(())
            }
            (_, UserAction::Command(Command::Start)) => {
                session.reset();
                self.advance(session, MenuConfirm, turn);
                Ok(())
            }
            (Start | MenuConfirm, Text(text)) if text.trim() == MENU_BUTTON => {
                self.advance(session, CompanyInput, turn);
                Ok(())
            }
            (Start, _) => {
                self.advance(session, MenuConfirm, turn);
                Ok(())
            }
            (MenuConfirm, _) => Err(StepError::Validation(USE_MENU_BUTTON.to_owned())),

            (CompanyInput | CompanySelect, Text(text)) => self.company_query(session, text, turn),
            (CompanySelect, Choice(choice)) => {
                self.lookup_selected(session, Lookup::Company, choice, turn)
            }
            (AgreementNumber, Text(text)) => {
                let number = text.trim();
                if number.is_empty() {
                    return Err(StepError::Validation(
                        "Номер допсоглашения не может быть пустым.".to_owned(),
                    ));
                }
                session.fields.agreement_number = Some(number.to_owned());
                self.advance(session, DialogueStep::PaymentType, turn);
                Ok(())
            }

            (DialogueStep::PaymentType, Text(text)) => {
                let payment = PaymentType::from_input(text).ok_or_else(invalid_payment)?;
                self.payment_chosen(session, payment, turn);
                Ok(())
            }
            (DialogueStep::PaymentType, Choice(choice)) if choice.kind == ChoiceKind::Payment => {
                let payment = PaymentType::from_code(&choice.value).ok_or_else(invalid_payment)?;
                turn.push(Reply::ReplaceSource(format!("Оплата: {}", payment.summary_label())));
                self.payment_chosen(session, payment, turn);
                Ok(())
            }
            (DialogueStep::PaymentType, _) => Err(invalid_payment()),

            (DialogueStep::DeliveryType, Text(text)) => {
                let delivery = DeliveryType::from_input(text).ok_or_else(invalid_delivery)?;
                self.delivery_chosen(session, delivery, turn);
                Ok(())
            }
            (DialogueStep::DeliveryType, Choice(choice)) if choice.kind == ChoiceKind::Delivery => {
                let delivery =
                    DeliveryType::from_code(&choice.value).ok_or_else(invalid_delivery)?;
                turn.push(Reply::ReplaceSource(format!("Поставка: {}", delivery.summary_label())));
                self.delivery_chosen(session, delivery, turn);
                Ok(())
            }
            (DialogueStep::DeliveryType, _) => Err(invalid_delivery()),

            (CurrentDate, Text(text)) => {
                session.fields.agreement_date = Some(self.parse_date(text)?);
                self.advance(session, DeliveryDate, turn);
                Ok(())
            }
            (DeliveryDate, Text(text)) => {
                session.fields.delivery_date = Some(self.parse_date(text)?);
                if session.fields.payment_type == Some(PaymentType::Prepayment) {
                    session.fields.payment_date = session.fields.agreement_date;
                    self.advance(session, ProductInput, turn);
                } else {
                    self.advance(session, PayDate, turn);
                }
                Ok(())
            }
            (PayDate, Text(text)) => {
                session.fields.payment_date = Some(self.parse_date(text)?);
                self.advance(session, ProductInput, turn);
                Ok(())
            }

            (ProductInput | ProductSelect, Text(text)) => {
                self.lookup_query(session, Lookup::Product, text, turn)
            }
            (ProductSelect, Choice(choice)) => {
                self.lookup_selected(session, Lookup::Product, choice, turn)
            }
            (Tons, Text(text)) => {
                session.fields.tons = Some(parse_positive(
                    text,
                    "Количество тонн должно быть целым числом больше 0.",
                )?);
                self.advance(session, Price, turn);
                Ok(())
            }
            (Price, Text(text)) => {
                session.fields.price =
                    Some(parse_positive(text, "Цена должна быть целым числом больше 0.")?);
                self.advance(session, LocationInput, turn);
                Ok(())
            }
            (LocationInput | LocationSelect, Text(text)) => {
                self.lookup_query(session, Lookup::Location, text, turn)
            }
            (LocationSelect, Choice(choice)) => {
                self.lookup_selected(session, Lookup::Location, choice, turn)
            }
            (UnloadAddress, Text(text)) => {
                let address = text.trim();
                if address.is_empty() {
                    return Err(StepError::Validation(
                        "Адрес доставки не может быть пустым.".to_owned(),
                    ));
                }
                session.fields.unload_address = Some(address.to_owned());
                self.advance(session, Confirm, turn);
                Ok(())
            }

            (Confirm, Choice(choice))
                if choice.kind == ChoiceKind::Confirm && choice.value == CONFIRM_GENERATE =>
            {
                self.generate(session, turn)
            }
            (Confirm, Choice(choice))
                if choice.kind == ChoiceKind::Confirm && choice.value == CONFIRM_CANCEL =>
            {
                self.cancel_from_confirm(session, turn);
                Ok(())
            }
            (Confirm, Text(text)) if same_label(text, GENERATE_LABEL) => {
                self.generate(session, turn)
            }
            (Confirm, Text(text)) if same_label(text, CANCEL_LABEL) => {
                self.cancel_from_confirm(session, turn);
                Ok(())
            }
            (Confirm, _) => {
                Err(StepError::Validation("Некорректная команда подтверждения.".to_owned()))
            }

            (step, Choice(_)) => Err(StepError::Validation(format!(
                "Ожидается текстовый ответ. {}",
                text_prompt(step)
            ))),
        }
    }

    fn report_error(
        &self,
        session: &Session,
        action: &UserAction,
        error: &StepError,
        turn: &mut Turn,
    ) {
        let message = error.user_message().to_owned();
        let reply = match (action, session.step) {
            (UserAction::Choice(_), _) => Reply::ReplaceSource(message),
            (_, DialogueStep::MenuConfirm) => menu_reply(&message),
            _ => Reply::text(message),
        };
        turn.push(reply);

        if matches!(error, StepError::StaleSelection(_)) {
            return;
        }
        if matches!(
            session.step,
            DialogueStep::PaymentType | DialogueStep::DeliveryType | DialogueStep::Confirm
        ) {
            turn.push(self.prompt(session.step, session));
        }
    }

    fn advance(&self, session: &mut Session, step: DialogueStep, turn: &mut Turn) {
        session.step = step;
        turn.push(self.prompt(step, session));
    }

    /// Prompt that asks for the input `step` expects.
    pub fn prompt(&self, step: DialogueStep, session: &Session) -> Reply {
        match step {
            DialogueStep::Start | DialogueStep::MenuConfirm => menu_reply(MENU_PROMPT),
            DialogueStep::CompanyInput => {
                Reply::with_keyboard(COMPANY_PROMPT, Keyboard::RemoveMenu)
            }
            DialogueStep::CompanySelect => self.selection_prompt(Lookup::Company, session),
            DialogueStep::ProductSelect => self.selection_prompt(Lookup::Product, session),
            DialogueStep::LocationSelect => self.selection_prompt(Lookup::Location, session),
            DialogueStep::PaymentType => Reply::with_keyboard(
                PAYMENT_PROMPT,
                Keyboard::Choices(
                    PaymentType::ALL
                        .into_iter()
                        .map(|payment| {
                            ChoiceOption::new(
                                payment.button_label(),
                                ChoiceData::new(ChoiceKind::Payment, payment.code()),
                            )
                        })
                        .collect(),
                ),
            ),
            DialogueStep::DeliveryType => Reply::with_keyboard(
                DELIVERY_PROMPT,
                Keyboard::Choices(
                    DeliveryType::ALL
                        .into_iter()
                        .map(|delivery| {
                            ChoiceOption::new(
                                delivery.button_label(),
                                ChoiceData::new(ChoiceKind::Delivery, delivery.code()),
                            )
                        })
                        .collect(),
                ),
            ),
            DialogueStep::Confirm => Reply::with_keyboard(
                self.summary(session),
                Keyboard::Choices(vec![
                    ChoiceOption::new(
                        GENERATE_LABEL,
                        ChoiceData::new(ChoiceKind::Confirm, CONFIRM_GENERATE),
                    ),
                    ChoiceOption::new(
                        CANCEL_LABEL,
                        ChoiceData::new(ChoiceKind::Confirm, CONFIRM_CANCEL),
                    ),
                ]),
            ),
            other => Reply::text(text_prompt(other)),
        }
    }

    fn selection_prompt(&self, lookup: Lookup, session: &Session) -> Reply {
        let Some(pending) = &session.pending else {
            return self.prompt(lookup.input_step(), session);
        };
        Reply::with_keyboard(
            lookup.several_found(),
            Keyboard::Choices(
                pending
                    .candidates
                    .iter()
                    .enumerate()
                    .map(|(index, candidate)| {
                        ChoiceOption::new(
                            format!("{} — {}", candidate.key, candidate.label),
                            ChoiceData::new(
                                lookup.choice_kind(),
                                PendingSelection::choice_value(index, &candidate.key),
                            ),
                        )
                    })
                    .collect(),
            ),
        )
    }

    fn candidates(&self, lookup: Lookup, query: &str) -> Vec<MatchCandidate> {
        match lookup {
            Lookup::Company => self.catalog.find_companies(query),
            Lookup::Product => self.catalog.find_products(query),
            Lookup::Location => self.catalog.find_locations(query),
        }
    }

    fn key_exists(&self, lookup: Lookup, key: &str) -> bool {
        match lookup {
            Lookup::Company => self.catalog.client(key).is_some(),
            Lookup::Product => self.catalog.product_label(key).is_some(),
            Lookup::Location => self.catalog.location_label(key).is_some(),
        }
    }

    fn company_query(
        &self,
        session: &mut Session,
        text: &str,
        turn: &mut Turn,
    ) -> Result<(), StepError> {
        let (query, number) = split_company_input(text)?;
        self.run_lookup(session, Lookup::Company, query, number, turn)
    }

    fn lookup_query(
        &self,
        session: &mut Session,
        lookup: Lookup,
        text: &str,
        turn: &mut Turn,
    ) -> Result<(), StepError> {
        self.run_lookup(session, lookup, text, None, turn)
    }

    fn run_lookup(
        &self,
        session: &mut Session,
        lookup: Lookup,
        query: &str,
        agreement_number: Option<String>,
        turn: &mut Turn,
    ) -> Result<(), StepError> {
        session.pending = None;
        let mut candidates = self.candidates(lookup, query);

        match candidates.len() {
            0 => {
                session.step = lookup.input_step();
                Err(StepError::LookupMiss(lookup.not_found().to_owned()))
            }
            1 => {
                let chosen = candidates.remove(0);
                self.lookup_resolved(session, lookup, chosen.key, agreement_number, turn);
                Ok(())
            }
            _ => {
                session.pending = Some(PendingSelection { candidates, agreement_number });
                self.advance(session, lookup.select_step(), turn);
                Ok(())
            }
        }
    }

    fn lookup_selected(
        &self,
        session: &mut Session,
        lookup: Lookup,
        choice: &ChoiceData,
        turn: &mut Turn,
    ) -> Result<(), StepError> {
        let pending = session.pending.take().unwrap_or_default();

        let selected = (choice.kind == lookup.choice_kind())
            .then(|| pending.selected(&choice.value))
            .flatten();
        let Some(candidate) = selected else {
            session.step = lookup.input_step();
            return Err(StepError::StaleSelection(lookup.invalid_choice().to_owned()));
        };
        if !self.key_exists(lookup, &candidate.key) {
            session.step = lookup.input_step();
            return Err(StepError::StaleSelection(lookup.vanished().to_owned()));
        }

        let key = candidate.key.clone();
        turn.push(Reply::ReplaceSource(format!("Выбрано: {key}")));
        self.lookup_resolved(session, lookup, key, pending.agreement_number, turn);
        Ok(())
    }

    fn lookup_resolved(
        &self,
        session: &mut Session,
        lookup: Lookup,
        key: String,
        agreement_number: Option<String>,
        turn: &mut Turn,
    ) {
        match lookup {
            Lookup::Company => {
                session.fields.company_key = Some(key);
                match agreement_number {
                    Some(number) => {
                        session.fields.agreement_number = Some(number);
                        self.advance(session, DialogueStep::PaymentType, turn);
                    }
                    None => self.advance(session, DialogueStep::AgreementNumber, turn),
                }
            }
            Lookup::Product => {
                session.fields.product_key = Some(key);
                self.advance(session, DialogueStep::Tons, turn);
            }
            Lookup::Location => {
                session.fields.location_key = Some(key);
                let next = if session.fields.delivery_type == Some(DeliveryType::Delivery) {
                    DialogueStep::UnloadAddress
                } else {
                    DialogueStep::Confirm
                };
                self.advance(session, next, turn);
            }
        }
    }

    fn payment_chosen(&self, session: &mut Session, payment: PaymentType, turn: &mut Turn) {
        session.fields.payment_type = Some(payment);
        self.advance(session, DialogueStep::DeliveryType, turn);
    }

    fn delivery_chosen(&self, session: &mut Session, delivery: DeliveryType, turn: &mut Turn) {
        session.fields.delivery_type = Some(delivery);
        self.advance(session, DialogueStep::CurrentDate, turn);
    }

    fn parse_date(&self, text: &str) -> Result<chrono::NaiveDate, StepError> {
        parse_day_month(text, self.clock.today())
            .map_err(|_| StepError::Validation(INVALID_DATE.to_owned()))
    }

    fn generate(&self, session: &mut Session, turn: &mut Turn) -> Result<(), StepError> {
        let agreement = session.fields.complete()?;
        let template = TemplateId::select(agreement.payment_type, agreement.delivery_type);
        let fields = build_document_fields(&agreement, &self.catalog)?;
        let content = self.renderer.render(template, &fields)?;
        let file_name = output_file_name(&agreement);

        turn.push(Reply::Document(RenderedDocument {
            file_name: file_name.clone(),
            content_type: content.content_type,
            bytes: content.bytes,
        }));
        turn.push(Reply::ReplaceSource(DONE_TEXT.to_owned()));
        turn.push(menu_reply(ANOTHER_ONE_TEXT));
        turn.completion = Some(Completion::Generated { file_name });
        session.reset();
        Ok(())
    }

    fn cancel_from_confirm(&self, session: &mut Session, turn: &mut Turn) {
        session.reset();
        turn.completion = Some(Completion::Cancelled);
        turn.push(Reply::ReplaceSource(CONFIRM_CANCELLED_TEXT.to_owned()));
        turn.push(menu_reply(MENU_PROMPT));
    }

    /// Review text shown before generation, one line per collected field.
    pub fn summary(&self, session: &Session) -> String {
        let fields = &session.fields;
        let missing = || "—".to_owned();
        let keyed = |key: &Option<String>, label: Option<&str>| match (key, label) {
            (Some(key), Some(label)) => format!("{key} ({label})"),
            (Some(key), None) => key.clone(),
            (None, _) => missing(),
        };

        let company_label = fields
            .company_key
            .as_deref()
            .and_then(|key| self.catalog.client(key))
            .map(|client| client.company_name.as_str());
        let product_label =
            fields.product_key.as_deref().and_then(|key| self.catalog.product_label(key));
        let location_label =
            fields.location_key.as_deref().and_then(|key| self.catalog.location_label(key));
        let date =
            |value: Option<chrono::NaiveDate>| value.map(format_short).unwrap_or_else(missing);
        let number = |value: Option<u64>| value.map(|n| n.to_string()).unwrap_or_else(missing);

        let mut lines = vec![
            "Проверьте данные:".to_owned(),
            format!("Компания: {}", keyed(&fields.company_key, company_label)),
            format!(
                "Номер допсоглашения: {}",
                fields.agreement_number.clone().unwrap_or_else(missing)
            ),
            format!(
                "Оплата: {}",
                fields.payment_type.map(PaymentType::summary_label).unwrap_or("—")
            ),
            format!(
                "Поставка: {}",
                fields.delivery_type.map(DeliveryType::summary_label).unwrap_or("—")
            ),
            format!("Дата допсоглашения: {}", date(fields.agreement_date)),
            format!("Дата поставки: {}", date(fields.delivery_date)),
            format!("Дата оплаты: {}", date(fields.payment_date)),
            format!("Продукт: {}", keyed(&fields.product_key, product_label)),
            format!("Тонн: {}", number(fields.tons)),
            format!("Цена: {}", number(fields.price)),
            format!("Локация: {}", keyed(&fields.location_key, location_label)),
        ];
        if fields.delivery_type == Some(DeliveryType::Delivery) {
            lines.push(format!(
                "Адрес доставки: {}",
                fields.unload_address.clone().unwrap_or_else(missing)
            ));
        }
        lines.join("\n")
    }
}

fn menu_reply(text: &str) -> Reply {
    Reply::with_keyboard(text, Keyboard::Menu(MENU_BUTTON.to_owned()))
}

fn text_prompt(step: DialogueStep) -> &'static str {
    match step {
        DialogueStep::Start | DialogueStep::MenuConfirm => MENU_PROMPT,
        DialogueStep::CompanyInput | DialogueStep::CompanySelect => COMPANY_PROMPT,
        DialogueStep::AgreementNumber => AGREEMENT_NUMBER_PROMPT,
        DialogueStep::PaymentType => PAYMENT_PROMPT,
        DialogueStep::DeliveryType => DELIVERY_PROMPT,
        DialogueStep::CurrentDate => CURRENT_DATE_PROMPT,
        DialogueStep::DeliveryDate => DELIVERY_DATE_PROMPT,
        DialogueStep::PayDate => PAY_DATE_PROMPT,
        DialogueStep::ProductInput | DialogueStep::ProductSelect => PRODUCT_PROMPT,
        DialogueStep::Tons => TONS_PROMPT,
        DialogueStep::Price => PRICE_PROMPT,
        DialogueStep::LocationInput | DialogueStep::LocationSelect => LOCATION_PROMPT,
        DialogueStep::UnloadAddress => UNLOAD_ADDRESS_PROMPT,
        DialogueStep::Confirm => "Проверьте данные и подтвердите генерацию.",
    }
}

fn invalid_payment() -> StepError {
    StepError::Validation("Некорректный выбор типа оплаты.".to_owned())
}

fn invalid_delivery() -> StepError {
    StepError::Validation("Некорректный выбор типа поставки.".to_owned())
}

fn same_label(text: &str, label: &str) -> bool {
    crate::catalog::normalize(text) == crate::catalog::normalize(label)
}

/// `"сиб, 12"` gives the query and the agreement number; `"сиб"` alone
/// leaves the number to a later step.
fn split_company_input(text: &str) -> Result<(&str, Option<String>), StepError> {
    let (query, number) = match text.split_once(',') {
        Some((query, number)) => (query.trim(), number.trim()),
        None => (text.trim(), ""),
    };
    if query.is_empty() {
        return Err(StepError::Validation(COMPANY_FORMAT_HINT.to_owned()));
    }
    let number = (!number.is_empty()).then(|| number.to_owned());
    Ok((query, number))
}

fn parse_positive(text: &str, message: &str) -> Result<u64, StepError> {
    match text.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(StepError::Validation(message.to_owned())),
    }
}
