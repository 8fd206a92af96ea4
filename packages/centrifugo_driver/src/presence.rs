//! Membership checks against presence replies.

use serde_json::Value;

use crate::user_id;

/// Whether a presence reply lists `user_id` among the channel's members.
///
/// Accepts `{"channel": ..., "data": [{"user": ...}, ...]}` at the top level or
/// inside the broker's `result` envelope. A reply without a `channel`, or whose
/// `data` is not a list, never matches.
pub fn contains_user(body: &Value, user_id: i64) -> bool {
    let presence = match body.get("result") {
        Some(result) if result.get("data").is_some() => result,
        _ => body,
    };

    let has_channel = presence.get("channel").is_some_and(|c| !c.is_null());
    let Some(Value::Array(members)) = presence.get("data") else {
        return false;
    };
    if !has_channel {
        return false;
    }

    members
        .iter()
        .filter_map(|member| member.get("user"))
        .filter(|user| !user.is_null())
        .any(|user| user_id::normalize(user) == user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_body() {
        assert!(!contains_user(&json!([]), 123));
        assert!(!contains_user(&json!({}), 123));
        assert!(!contains_user(&Value::Null, 123));
    }

    #[test]
    fn data_not_a_list() {
        assert!(!contains_user(&json!({"data": 3, "channel": "channel"}), 123));
        // newer brokers key presence by client id
        assert!(!contains_user(
            &json!({"data": {"c1": {"user": "123"}}, "channel": "channel"}),
            123
        ));
    }

    #[test]
    fn entries_without_user() {
        assert!(!contains_user(
            &json!({"data": ["somedata"], "channel": "channel"}),
            123
        ));
        assert!(!contains_user(
            &json!({"data": [{"user": null}], "channel": "channel"}),
            0
        ));
    }

    #[test]
    fn non_numeric_user() {
        assert!(!contains_user(
            &json!({"data": [{"user": "userId"}], "channel": "channel"}),
            123
        ));
    }

    #[test]
    fn string_and_integer_users_match() {
        assert!(contains_user(
            &json!({"data": [{"user": "123"}], "channel": "channel"}),
            123
        ));
        assert!(contains_user(
            &json!({"data": [{"user": 123}], "channel": "channel"}),
            123
        ));
        assert!(contains_user(
            &json!({"data": [{"user": "5"}, {"user": 123.4}], "channel": "channel"}),
            123
        ));
    }

    #[test]
    fn missing_channel() {
        assert!(!contains_user(&json!({"data": [{"user": "123"}]}), 123));
        assert!(!contains_user(
            &json!({"data": [{"user": "123"}], "channel": null}),
            123
        ));
    }

    #[test]
    fn result_envelope() {
        let body = json!({"result": {"channel": "room", "data": [{"user": "123", "client": "c1"}]}});
        assert!(contains_user(&body, 123));
        assert!(!contains_user(&body, 124));
    }
}
