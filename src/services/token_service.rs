// src/services/token_service.rs
use tracing;

use crate::models::user::{DeliveryToken, RecipientClass, UserRecord, token_preview};

/// Removes every single and double quote.
pub fn strip_quotes(raw: &str) -> String {
    raw.chars().filter(|c| *c != '\'' && *c != '"').collect()
}

/// Collects one delivery token per record that carries a usable token, in
/// input order. Records without one are skipped.
pub fn extract_tokens(records: &[UserRecord], class: RecipientClass) -> Vec<DeliveryToken> {
    let tokens: Vec<DeliveryToken> = records
        .iter()
        .filter_map(|record| {
            let raw = match record.fcm_token.as_deref().map(str::trim) {
                Some(raw) if !raw.is_empty() => raw,
                _ => {
                    tracing::debug!("Skipping {} {} ({}): no FCM token", class, record.id, record.display_name());
                    return None;
                }
            };

            let token = strip_quotes(raw).trim().to_string();
            if token.is_empty() {
                tracing::debug!("Skipping {} {} ({}): token was only quotes", class, record.id, record.display_name());
                return None;
            }

            tracing::debug!("Token for {} {}: {}...", class, record.id, token_preview(&token, 50));
            Some(DeliveryToken {
                token,
                owner_id: record.id.clone(),
                owner_name: record.display_name().to_string(),
                class,
            })
        })
        .collect();

    tracing::info!("Collected {} valid {} tokens from {} records", tokens.len(), class, records.len());
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;

    fn record(id: &str, token: Option<&str>) -> UserRecord {
        UserRecord {
            id: id.to_string(),
            name: None,
            role: UserRole::Courier,
            status: None,
            fcm_token: token.map(str::to_string),
        }
    }

    #[test]
    fn test_strips_quotes_and_whitespace() {
        let tokens = extract_tokens(&[record("u1", Some("  'abc123' "))], RecipientClass::Courier);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token, "abc123");
        assert_eq!(tokens[0].owner_id, "u1");
        assert_eq!(tokens[0].owner_name, "Sin nombre");
        assert_eq!(tokens[0].class, RecipientClass::Courier);
    }

    #[test]
    fn test_quotes_inside_the_token_are_removed() {
        assert_eq!(strip_quotes("\"ab'c\"d"), "abcd");
    }

    #[test]
    fn test_skips_missing_and_blank_tokens() {
        let records = vec![
            record("u1", None),
            record("u2", Some("")),
            record("u3", Some("   ")),
            record("u4", Some("\"\"")),
            record("u5", Some("tok-5")),
        ];

        let tokens = extract_tokens(&records, RecipientClass::Administrator);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].owner_id, "u5");
        assert_eq!(tokens[0].class, RecipientClass::Administrator);
    }

    #[test]
    fn test_preserves_input_order_without_dedup() {
        let records = vec![record("b", Some("same")), record("a", Some("same"))];
        let tokens = extract_tokens(&records, RecipientClass::Courier);
        let owners: Vec<&str> = tokens.iter().map(|t| t.owner_id.as_str()).collect();
        assert_eq!(owners, vec!["b", "a"]);
    }
}
