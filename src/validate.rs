//! Request body checks. Every problem in a body is reported, not just the
//! first, and accepted values come back trimmed.

use serde::Deserialize;

use crate::{db::MessageKind, ChatError, ChatResult};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewParticipant {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewMessage {
    pub to: Option<String>,
    pub text: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidMessage {
    pub to: String,
    pub text: String,
    pub kind: MessageKind,
}

impl NewParticipant {
    pub fn validate(self) -> ChatResult<String> {
        let mut errors = Vec::new();
        let name = required("name", self.name, &mut errors);
        finish(errors)?;
        Ok(name.unwrap_or_default())
    }
}

impl NewMessage {
    pub fn validate(self) -> ChatResult<ValidMessage> {
        let mut errors = Vec::new();
        let to = required("to", self.to, &mut errors);
        let text = required("text", self.text, &mut errors);
        let kind = required("type", self.kind, &mut errors).and_then(|kind| {
            match kind.to_lowercase().as_str() {
                "message" => Some(MessageKind::Message),
                "private_message" => Some(MessageKind::PrivateMessage),
                _ => {
                    errors.push(r#""type" must be one of [message, private_message]"#.to_owned());
                    None
                }
            }
        });
        finish(errors)?;

        match (to, text, kind) {
            (Some(to), Some(text), Some(kind)) => Ok(ValidMessage { to, text, kind }),
            _ => Err(ChatError::Validation(vec!["incomplete message".to_owned()])),
        }
    }
}

fn required(field: &str, value: Option<String>, errors: &mut Vec<String>) -> Option<String> {
    let Some(value) = value else {
        errors.push(format!("\"{field}\" is required"));
        return None;
    };

    let value = value.trim();
    if value.is_empty() {
        errors.push(format!("\"{field}\" is not allowed to be empty"));
        return None;
    }
    Some(value.to_owned())
}

fn finish(errors: Vec<String>) -> ChatResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ChatError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: Option<&str>, text: Option<&str>, kind: Option<&str>) -> NewMessage {
        NewMessage {
            to: to.map(str::to_owned),
            text: text.map(str::to_owned),
            kind: kind.map(str::to_owned),
        }
    }

    fn details(err: ChatError) -> Vec<String> {
        match err {
            ChatError::Validation(details) => details,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn name_is_trimmed() {
        let name = NewParticipant { name: Some("  Ann ".to_owned()) }.validate().unwrap();
        assert_eq!(name, "Ann");
    }

    #[test]
    fn blank_or_missing_name_is_rejected() {
        let missing = details(NewParticipant { name: None }.validate().unwrap_err());
        assert_eq!(missing, [r#""name" is required"#]);

        let blank = details(NewParticipant { name: Some("   ".to_owned()) }.validate().unwrap_err());
        assert_eq!(blank, [r#""name" is not allowed to be empty"#]);
    }

    #[test]
    fn type_is_case_insensitive() {
        let valid = message(Some(" Bob "), Some(" hi "), Some("Private_Message")).validate().unwrap();
        assert_eq!(
            valid,
            ValidMessage {
                to: "Bob".to_owned(),
                text: "hi".to_owned(),
                kind: MessageKind::PrivateMessage,
            }
        );
    }

    #[test]
    fn status_cannot_be_posted() {
        let errs = details(message(Some("everyone"), Some("hi"), Some("status")).validate().unwrap_err());
        assert_eq!(errs, [r#""type" must be one of [message, private_message]"#]);
    }

    #[test]
    fn all_problems_are_reported_together() {
        let errs = details(message(None, Some(" "), Some("shout")).validate().unwrap_err());
        assert_eq!(errs.len(), 3);
        assert!(errs.contains(&r#""to" is required"#.to_owned()));
        assert!(errs.contains(&r#""text" is not allowed to be empty"#.to_owned()));
    }

    #[test]
    fn unknown_fields_are_refused() {
        let parsed = serde_json::from_str::<NewParticipant>(r#"{"name":"Ann","admin":true}"#);
        assert!(parsed.is_err());
    }
}
