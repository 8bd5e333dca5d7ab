use std::fmt;

pub const GENERIC_GREETING: &str = "👋 Hello there,";

const PLACEHOLDER_NAMES: &[&str] = &["patient", "none"];

pub fn greeting_for(username: Option<&str>) -> String {
    match username.map(str::trim) {
        Some(name)
            if !name.is_empty()
                && !PLACEHOLDER_NAMES
                    .iter()
                    .any(|placeholder| placeholder.eq_ignore_ascii_case(name)) =>
        {
            format!("👋 Hello {name},")
        }
        _ => GENERIC_GREETING.to_owned(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalResponse {
    greeting: String,
    body: String,
}

impl FinalResponse {
    pub fn new(username: Option<&str>, body: String) -> Self {
        Self {
            greeting: greeting_for(username),
            body,
        }
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

impl fmt::Display for FinalResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n\n{}", self.greeting, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_names_get_generic_greeting() {
        for name in [None, Some(""), Some("  "), Some("Patient"), Some("NONE")] {
            assert_eq!(greeting_for(name), GENERIC_GREETING);
        }
    }

    #[test]
    fn real_name_is_personalized() {
        assert_eq!(greeting_for(Some("Meera")), "👋 Hello Meera,");
    }

    #[test]
    fn renders_greeting_blank_line_body() {
        let response = FinalResponse::new(Some("Meera"), "Rest well.".to_owned());
        assert_eq!(response.to_string(), "👋 Hello Meera,\n\nRest well.");
        assert_eq!(response.body(), "Rest well.");
    }
}
