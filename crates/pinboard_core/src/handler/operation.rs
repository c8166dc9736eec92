//! Operation selection from a request envelope.
//!
//! `OPTIONS` is the pre-flight probe, `GET` reads (`id` selects one pin),
//! `POST` writes with the JSON body's `action` (`create` when absent).

use super::envelope::Request;
use super::HandlerError;
use crate::model::pin::{parse_pin_id, PinId, SortOrder};
use serde::Deserialize;

/// One dispatchable operation with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Probe,
    List {
        search: Option<String>,
        sort: SortOrder,
    },
    Get {
        id: PinId,
    },
    Create {
        title: Option<String>,
        description: Option<String>,
        content: Option<String>,
    },
    Like {
        pin_id: Option<PinId>,
    },
    Comment {
        pin_id: Option<PinId>,
        username: Option<String>,
        content: Option<String>,
    },
}

impl Operation {
    /// Stable name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Probe => "probe",
            Self::List { .. } => "list",
            Self::Get { .. } => "get",
            Self::Create { .. } => "create",
            Self::Like { .. } => "like",
            Self::Comment { .. } => "comment",
        }
    }

    pub fn from_request(request: &Request) -> Result<Self, HandlerError> {
        let method = request.method();
        match method.as_str() {
            "OPTIONS" => Ok(Self::Probe),
            "GET" => Self::from_query(request),
            "POST" => Self::from_body(request.body.as_deref()),
            _ => Err(HandlerError::MethodNotAllowed(method)),
        }
    }

    fn from_query(request: &Request) -> Result<Self, HandlerError> {
        if let Some(raw_id) = request.query_param("id").filter(|raw| !raw.trim().is_empty()) {
            return Ok(Self::Get {
                id: parse_pin_id(raw_id)?,
            });
        }

        Ok(Self::List {
            search: request.query_param("search").map(str::to_string),
            sort: SortOrder::parse_lenient(request.query_param("sort")),
        })
    }

    fn from_body(body: Option<&str>) -> Result<Self, HandlerError> {
        let body = match body.map(str::trim) {
            Some(raw) if !raw.is_empty() => serde_json::from_str::<ActionBody>(raw)
                .map_err(|err| HandlerError::MalformedBody(err.to_string()))?,
            _ => ActionBody::default(),
        };

        let action = body.action.as_deref().unwrap_or("create");
        match action {
            "create" => Ok(Self::Create {
                title: body.title,
                description: body.description,
                content: body.content,
            }),
            "like" => Ok(Self::Like {
                pin_id: resolve_pin_id(body.pin_id)?,
            }),
            "comment" => Ok(Self::Comment {
                pin_id: resolve_pin_id(body.pin_id)?,
                username: body.username,
                content: body.content,
            }),
            other => Err(HandlerError::MethodNotAllowed(format!("POST action={other}"))),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ActionBody {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    pin_id: Option<PinIdField>,
}

/// Clients send `pin_id` either as a number or as a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PinIdField {
    Number(PinId),
    Text(String),
}

/// `null` and `""` count as missing; other text must parse as an id.
fn resolve_pin_id(field: Option<PinIdField>) -> Result<Option<PinId>, HandlerError> {
    match field {
        None => Ok(None),
        Some(PinIdField::Number(id)) => Ok(Some(id)),
        Some(PinIdField::Text(raw)) if raw.trim().is_empty() => Ok(None),
        Some(PinIdField::Text(raw)) => Ok(Some(parse_pin_id(&raw)?)),
    }
}
