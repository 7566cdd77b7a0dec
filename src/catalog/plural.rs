//! Russian plural selection for count labels.

/// Grammatical plural form for a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralForm {
    /// 1, 21, 101, ...
    One,
    /// 2–4, 22–24, ...
    Few,
    /// 0, 5–20, 25–30, 111, ...
    Many,
}

/// Pick the plural form for `n`.
///
/// The teens (11–19 modulo 100) always take [`PluralForm::Many`] even
/// though their last digit alone would suggest otherwise.
pub fn plural_form(n: u64) -> PluralForm {
    let mod10 = n % 10;
    let mod100 = n % 100;

    if mod100 > 10 && mod100 < 20 {
        return PluralForm::Many;
    }
    if mod10 > 1 && mod10 < 5 {
        return PluralForm::Few;
    }
    if mod10 == 1 {
        return PluralForm::One;
    }
    PluralForm::Many
}

/// Pick one of three strings by the plural form of `n`.
pub fn select<'a>(n: u64, one: &'a str, few: &'a str, many: &'a str) -> &'a str {
    match plural_form(n) {
        PluralForm::One => one,
        PluralForm::Few => few,
        PluralForm::Many => many,
    }
}

/// Header label such as "3 активных инструмента".
pub fn tool_count_label(n: u64) -> String {
    let noun = select(
        n,
        "активный инструмент",
        "активных инструмента",
        "активных инструментов",
    );
    format!("{n} {noun}")
}
