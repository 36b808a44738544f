//! JSON response lines.
//!
//! Every command is answered with exactly one JSON object on one line,
//! tagged by `status`. Successful payload fields sit next to the tag.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::GameError;

use super::parser::ParseError;

/// One protocol reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok(Map<String, Value>),
    Error { kind: String, message: String },
}

impl Response {
    /// A success with no payload.
    pub fn ok() -> Self {
        Response::Ok(Map::new())
    }

    /// A success whose fields are taken from `payload`.
    ///
    /// Structs are flattened into the response; any other value is placed
    /// under `value`.
    pub fn with<T: Serialize>(payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(Value::Object(fields)) => Response::Ok(fields),
            Ok(other) => {
                let mut fields = Map::new();
                fields.insert("value".to_string(), other);
                Response::Ok(fields)
            }
            Err(e) => Response::Error {
                kind: "internal".to_string(),
                message: e.to_string(),
            },
        }
    }

    /// Adds one field to a success. Errors are returned unchanged.
    pub fn field<T: Serialize>(self, key: &str, value: T) -> Self {
        match self {
            Response::Ok(mut fields) => match serde_json::to_value(value) {
                Ok(v) => {
                    fields.insert(key.to_string(), v);
                    Response::Ok(fields)
                }
                Err(e) => Response::Error {
                    kind: "internal".to_string(),
                    message: e.to_string(),
                },
            },
            err => err,
        }
    }

    pub fn invalid_command(err: &ParseError) -> Self {
        Response::Error {
            kind: "invalid_command".to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok(_))
    }

    /// Renders the response as a single line of JSON.
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                "{{\"status\":\"error\",\"kind\":\"internal\",\"message\":{:?}}}",
                e.to_string()
            )
        })
    }
}

impl From<&GameError> for Response {
    fn from(err: &GameError) -> Self {
        Response::Error {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

impl<T: Serialize> From<Result<T, GameError>> for Response {
    fn from(result: Result<T, GameError>) -> Self {
        match result {
            Ok(payload) => Response::with(&payload),
            Err(e) => Response::from(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Conflict;
    use serde_json::json;

    fn parsed(r: &Response) -> Value {
        serde_json::from_str(&r.to_line()).unwrap()
    }

    #[test]
    fn ok_flattens_struct_payloads() {
        #[derive(Serialize)]
        struct Payload {
            game: &'static str,
            players: usize,
        }
        let r = Response::with(&Payload { game: "g", players: 2 });
        assert_eq!(parsed(&r), json!({"status": "ok", "game": "g", "players": 2}));
    }

    #[test]
    fn scalars_and_fields() {
        assert_eq!(parsed(&Response::with(&3u8)), json!({"status": "ok", "value": 3}));
        assert_eq!(
            parsed(&Response::ok().field("game", "g")),
            json!({"status": "ok", "game": "g"})
        );
    }

    #[test]
    fn errors_carry_kind_and_message() {
        let r: Response = Err::<(), _>(GameError::from(Conflict::LobbyFull)).into();
        assert!(!r.is_ok());
        assert_eq!(
            parsed(&r),
            json!({"status": "error", "kind": "conflict", "message": "conflict: game lobby is full"})
        );

        let r = Response::invalid_command(&ParseError::Unknown("dance".into()));
        assert_eq!(parsed(&r)["kind"], "invalid_command");
        assert!(!r.to_line().contains('\n'));
    }
}
