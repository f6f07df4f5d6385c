//! Russian cardinal numbers for amounts written out in documents.

const UNITS_MASCULINE: [&str; 10] =
    ["", "один", "два", "три", "четыре", "пять", "шесть", "семь", "восемь", "девять"];
const UNITS_FEMININE: [&str; 10] =
    ["", "одна", "две", "три", "четыре", "пять", "шесть", "семь", "восемь", "девять"];
const TEENS: [&str; 10] = [
    "десять",
    "одиннадцать",
    "двенадцать",
    "тринадцать",
    "четырнадцать",
    "пятнадцать",
    "шестнадцать",
    "семнадцать",
    "восемнадцать",
    "девятнадцать",
];
const TENS: [&str; 10] = [
    "",
    "",
    "двадцать",
    "тридцать",
    "сорок",
    "пятьдесят",
    "шестьдесят",
    "семьдесят",
    "восемьдесят",
    "девяносто",
];
const HUNDREDS: [&str; 10] = [
    "",
    "сто",
    "двести",
    "триста",
    "четыреста",
    "пятьсот",
    "шестьсот",
    "семьсот",
    "восемьсот",
    "девятьсот",
];

#[derive(Clone, Copy)]
enum Gender {
    Masculine,
    Feminine,
}

struct Scale {
    gender: Gender,
    /// Forms for 1, 2..=4 and 5..=20.
    forms: [&'static str; 3],
}

const SCALES: [Scale; 7] = [
    Scale { gender: Gender::Masculine, forms: ["", "", ""] },
    Scale { gender: Gender::Feminine, forms: ["тысяча", "тысячи", "тысяч"] },
    Scale { gender: Gender::Masculine, forms: ["миллион", "миллиона", "миллионов"] },
    Scale { gender: Gender::Masculine, forms: ["миллиард", "миллиарда", "миллиардов"] },
    Scale { gender: Gender::Masculine, forms: ["триллион", "триллиона", "триллионов"] },
    Scale { gender: Gender::Masculine, forms: ["квадриллион", "квадриллиона", "квадриллионов"] },
    Scale { gender: Gender::Masculine, forms: ["квинтиллион", "квинтиллиона", "квинтиллионов"] },
];

/// Plural form index for a Russian noun after `n`.
pub fn plural_index(n: u64) -> usize {
    let last_two = n % 100;
    let last = n % 10;
    if (11..=14).contains(&last_two) {
        2
    } else if last == 1 {
        0
    } else if (2..=4).contains(&last) {
        1
    } else {
        2
    }
}

fn triad_words(value: u64, gender: Gender, words: &mut Vec<&'static str>) {
    let hundreds = (value / 100) as usize;
    let rest = value % 100;
    if hundreds > 0 {
        words.push(HUNDREDS[hundreds]);
    }
    if (10..20).contains(&rest) {
        words.push(TEENS[(rest - 10) as usize]);
        return;
    }
    let tens = (rest / 10) as usize;
    let units = (rest % 10) as usize;
    if tens > 0 {
        words.push(TENS[tens]);
    }
    if units > 0 {
        let table = match gender {
            Gender::Masculine => &UNITS_MASCULINE,
            Gender::Feminine => &UNITS_FEMININE,
        };
        words.push(table[units]);
    }
}

/// `62500` becomes `шестьдесят две тысячи пятьсот`.
pub fn to_words(value: u64) -> String {
    if value == 0 {
        return "ноль".to_owned();
    }

    let mut triads = Vec::new();
    let mut remaining = value;
    while remaining > 0 {
        triads.push(remaining % 1000);
        remaining /= 1000;
    }

    let mut words: Vec<&'static str> = Vec::new();

    for (scale_index, triad) in triads.iter().enumerate().rev() {
        if *triad == 0 {
            continue;
        }
        let scale = &SCALES[scale_index];
        triad_words(*triad, scale.gender, &mut words);
        if scale_index > 0 {
            words.push(scale.forms[plural_index(*triad)]);
        }
    }

    words.join(" ")
}

/// `62500` becomes `62 500`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (position, ch) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    grouped
}

/// `62 500 (шестьдесят две тысячи пятьсот)`
pub fn amount_with_words(value: u64) -> String {
    format!("{} ({})", group_thousands(value), to_words(value))
}

#[cfg(test)]
mod tests {
    use super::{amount_with_words, group_thousands, plural_index, to_words};

    #[test]
    fn small_numbers() {
        assert_eq!(to_words(0), "ноль");
        assert_eq!(to_words(1), "один");
        assert_eq!(to_words(12), "двенадцать");
        assert_eq!(to_words(25), "двадцать пять");
        assert_eq!(to_words(100), "сто");
        assert_eq!(to_words(999), "девятьсот девяносто девять");
    }

    #[test]
    fn thousands_are_feminine() {
        assert_eq!(to_words(1_000), "одна тысяча");
        assert_eq!(to_words(2_000), "две тысячи");
        assert_eq!(to_words(5_000), "пять тысяч");
        assert_eq!(to_words(11_000), "одиннадцать тысяч");
        assert_eq!(to_words(21_000), "двадцать одна тысяча");
        assert_eq!(to_words(62_500), "шестьдесят две тысячи пятьсот");
    }

    #[test]
    fn larger_scales_are_masculine() {
        assert_eq!(to_words(1_000_000), "один миллион");
        assert_eq!(to_words(2_000_001), "два миллиона один");
        assert_eq!(to_words(1_002_000_000), "один миллиард два миллиона");
        assert_eq!(to_words(1_000_000_000_000), "один триллион");
        assert!(to_words(u64::MAX).starts_with("восемнадцать квинтиллионов"));
    }

    #[test]
    fn plural_rules_cover_teens() {
        assert_eq!(plural_index(1), 0);
        assert_eq!(plural_index(3), 1);
        assert_eq!(plural_index(11), 2);
        assert_eq!(plural_index(14), 2);
        assert_eq!(plural_index(22), 1);
        assert_eq!(plural_index(111), 2);
    }

    #[test]
    fn grouped_amounts() {
        assert_eq!(group_thousands(7), "7");
        assert_eq!(group_thousands(62_500), "62 500");
        assert_eq!(group_thousands(1_234_567), "1 234 567");
        assert_eq!(amount_with_words(25), "25 (двадцать пять)");
        assert_eq!(amount_with_words(62_500), "62 500 (шестьдесят две тысячи пятьсот)");
    }
}
