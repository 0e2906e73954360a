// ── Operator help content ──
//
// Static per-operator help snippets shown next to the SIM/network status.
// Some operators only need one HTML string; others vary with the UI
// language.

use std::borrow::Cow;

use strum::{Display, EnumIter, EnumString};

/// UI language used to pick localized help text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Language {
    #[default]
    En,
    #[strum(to_string = "zh", serialize = "zh-cn", serialize = "zh_cn")]
    Zh,
    De,
    Fr,
}

enum HelpContent {
    Html(&'static str),
    Localized(fn(Language) -> &'static str),
}

fn china_mobile(lang: Language) -> &'static str {
    match lang {
        Language::Zh => "<p>中国移动客服热线：<a href=\"tel:10086\">10086</a></p>",
        _ => "<p>China Mobile customer service: <a href=\"tel:10086\">10086</a></p>",
    }
}

fn china_unicom(lang: Language) -> &'static str {
    match lang {
        Language::Zh => "<p>中国联通客服热线：<a href=\"tel:10010\">10010</a></p>",
        _ => "<p>China Unicom customer service: <a href=\"tel:10010\">10010</a></p>",
    }
}

fn china_telecom(lang: Language) -> &'static str {
    match lang {
        Language::Zh => "<p>中国电信客服热线：<a href=\"tel:10000\">10000</a></p>",
        _ => "<p>China Telecom customer service: <a href=\"tel:10000\">10000</a></p>",
    }
}

fn telekom_de(lang: Language) -> &'static str {
    match lang {
        Language::De => {
            "<p>Telekom Kundenservice: <a href=\"tel:+498003301000\">0800 330 1000</a></p>"
        }
        _ => "<p>Telekom customer service: <a href=\"tel:+498003301000\">+49 800 330 1000</a></p>",
    }
}

fn orange_fr(lang: Language) -> &'static str {
    match lang {
        Language::Fr => "<p>Service client Orange : <a href=\"tel:3900\">3900</a></p>",
        _ => "<p>Orange customer service (from France): <a href=\"tel:3900\">3900</a></p>",
    }
}

static PLMN_HELP: &[(&str, HelpContent)] = &[
    ("46000", HelpContent::Localized(china_mobile)),
    ("46002", HelpContent::Localized(china_mobile)),
    ("46007", HelpContent::Localized(china_mobile)),
    ("46001", HelpContent::Localized(china_unicom)),
    ("46006", HelpContent::Localized(china_unicom)),
    ("46003", HelpContent::Localized(china_telecom)),
    ("46011", HelpContent::Localized(china_telecom)),
    ("26201", HelpContent::Localized(telekom_de)),
    ("20801", HelpContent::Localized(orange_fr)),
    (
        "310260",
        HelpContent::Html("<p>T-Mobile support: dial <a href=\"tel:611\">611</a> from a T-Mobile line.</p>"),
    ),
    (
        "311480",
        HelpContent::Html("<p>Verizon support: dial <a href=\"tel:*611\">*611</a> from a Verizon line.</p>"),
    ),
    (
        "23415",
        HelpContent::Html("<p>Vodafone UK support: dial <a href=\"tel:191\">191</a> from a Vodafone line.</p>"),
    ),
];

/// Help HTML for `plmn`, rendered for `language` where the operator
/// provides localized text. `None` for operators without an entry.
pub fn help_content(plmn: &str, language: Language) -> Option<Cow<'static, str>> {
    let plmn = plmn.trim();
    PLMN_HELP
        .iter()
        .find(|(code, _)| *code == plmn)
        .map(|(_, content)| match content {
            HelpContent::Html(html) => Cow::Borrowed(*html),
            HelpContent::Localized(render) => Cow::Borrowed(render(language)),
        })
}

/// Every PLMN code with help content.
pub fn known_plmns() -> impl Iterator<Item = &'static str> {
    PLMN_HELP.iter().map(|(code, _)| *code)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn literal_entry_ignores_language() {
        let en = help_content("310260", Language::En).unwrap();
        let zh = help_content("310260", Language::Zh).unwrap();
        assert_eq!(en, zh);
        assert!(en.contains("611"));
    }

    #[test]
    fn localized_entry_follows_language() {
        let en = help_content("46000", Language::En).unwrap();
        let zh = help_content("46000", Language::Zh).unwrap();
        assert_ne!(en, zh);
        assert!(zh.contains("10086"));
        assert!(en.contains("China Mobile"));
    }

    #[test]
    fn unknown_plmn_has_no_content() {
        assert!(help_content("00101", Language::En).is_none());
    }

    #[test]
    fn language_parsing() {
        assert_eq!("zh-CN".parse::<Language>().unwrap(), Language::Zh);
        assert_eq!("DE".parse::<Language>().unwrap(), Language::De);
        assert!("xx".parse::<Language>().is_err());
    }

    #[test]
    fn table_codes_are_unique() {
        let mut codes: Vec<&str> = known_plmns().collect();
        let total = codes.len();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), total);
    }
}
