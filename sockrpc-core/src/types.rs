//! JSON-RPC 2.0 wire types
//!
//! This module implements the data structures a client exchanges with a
//! JSON-RPC 2.0 service (https://www.jsonrpc.org/specification):
//!
//! - **Request**: a method call with optional container parameters and an id
//! - **Params**: by-position (array) or by-name (object) parameters
//! - **RequestId**: a non-zero correlation id
//! - **Response**: either `Success` or `Failure`, never both
//!
//! # Wire Shapes
//!
//! ```text
//! request:  {"jsonrpc":"2.0","method":"bdev_get_bdevs","params":{...},"id":1}
//! success:  {"jsonrpc":"2.0","result":<any>,"id":1}
//! failure:  {"jsonrpc":"2.0","error":{"code":-32601,"message":"..."},"id":1}
//! ```
//!
//! `params` is omitted when absent. A success response always carries
//! `result`, including an explicit `"result":null`; that is what lets a
//! "no error, null result" reply survive re-serialization intact.

use crate::error::ErrorObject;
use serde::de::{self, Deserializer, Unexpected};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::num::NonZeroU64;

/// The protocol version string carried by every message
pub const JSONRPC_VERSION: &str = "2.0";

/// Correlation id for a request
///
/// Ids are issued by the client starting at 1. Zero is reserved and cannot
/// be represented, so an id is always present on the wire.
///
/// # Examples
///
/// ```rust
/// use sockrpc_core::RequestId;
///
/// let id = RequestId::new(7).unwrap();
/// assert_eq!(id.get(), 7);
/// assert!(RequestId::new(0).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(NonZeroU64);

impl RequestId {
    /// The first id a client issues
    pub const FIRST: RequestId = RequestId(NonZeroU64::MIN);

    /// Create an id; `None` for the reserved value 0
    pub fn new(id: u64) -> Option<Self> {
        NonZeroU64::new(id).map(RequestId)
    }

    /// The numeric value of the id
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request parameters
///
/// JSON-RPC 2.0 only allows structured parameters, so scalars are not
/// representable here. Conversion from an arbitrary `serde_json::Value` goes
/// through [`Params::from_value`], which is where scalars get rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Params {
    /// By-position parameters
    Array(Vec<Value>),
    /// By-name parameters
    Object(Map<String, Value>),
}

impl Params {
    /// Classify a JSON value as parameters
    ///
    /// - `null` means "no parameters" and yields `Ok(None)`
    /// - arrays and objects (including serialized structs) are accepted
    /// - anything else is rejected with the JSON kind of the value
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sockrpc_core::Params;
    /// use serde_json::json;
    ///
    /// assert!(Params::from_value(json!({"name": "Malloc0"})).unwrap().is_some());
    /// assert!(Params::from_value(json!(null)).unwrap().is_none());
    /// assert_eq!(Params::from_value(json!("Malloc0")).unwrap_err(), "string");
    /// ```
    pub fn from_value(value: Value) -> std::result::Result<Option<Self>, &'static str> {
        match value {
            Value::Null => Ok(None),
            Value::Array(items) => Ok(Some(Params::Array(items))),
            Value::Object(map) => Ok(Some(Params::Object(map))),
            other => Err(json_kind(&other)),
        }
    }

    /// True for `[]` and `{}`
    pub fn is_empty(&self) -> bool {
        match self {
            Params::Array(items) => items.is_empty(),
            Params::Object(map) => map.is_empty(),
        }
    }
}

impl<'de> Deserialize<'de> for Params {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match Params::from_value(Value::deserialize(deserializer)?) {
            Ok(Some(params)) => Ok(params),
            Ok(None) => Err(de::Error::invalid_type(Unexpected::Unit, &"an array or an object")),
            Err(kind) => Err(de::Error::invalid_type(Unexpected::Other(kind), &"an array or an object")),
        }
    }
}

impl From<Params> for Value {
    fn from(params: Params) -> Self {
        match params {
            Params::Array(items) => Value::Array(items),
            Params::Object(map) => Value::Object(map),
        }
    }
}

/// Name of a JSON value's kind, used in error messages
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// JSON-RPC 2.0 request message
///
/// # Examples
///
/// ```rust
/// use sockrpc_core::{Request, RequestId};
///
/// let request = Request::new("bdev_get_bdevs", None, RequestId::FIRST);
/// let json = serde_json::to_string(&request).unwrap();
/// assert_eq!(json, r#"{"jsonrpc":"2.0","method":"bdev_get_bdevs","id":1}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Always "2.0"
    pub jsonrpc: String,
    /// Name of the remote method
    pub method: String,
    /// Optional container parameters, omitted from the wire when `None`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
    /// Correlation id
    pub id: RequestId,
}

impl Request {
    /// Create a request with the fixed protocol version
    pub fn new(method: impl Into<String>, params: Option<Params>, id: RequestId) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id,
        }
    }
}

/// JSON-RPC 2.0 response message
///
/// A response is either a success carrying a result (which may be `null`)
/// or a failure carrying an error object. The variant is decided once, when
/// the response is decoded: a non-null `error` member makes it a `Failure`
/// and any `result` next to it is dropped; otherwise it is a `Success` whose
/// result defaults to `null` when the member was missing.
///
/// # Response Ids
///
/// `id` is `None` when the peer sent `null` or omitted it (the protocol does
/// that when it could not read the request id). Negative integers are
/// reinterpreted as unsigned, so they can never match an issued id by
/// accident of sign.
///
/// # Serialization
///
/// Serialization is hand-written and fixed per variant:
///
/// - `Success` → `{"jsonrpc":<version>,"result":<result>,"id":<id>}`,
///   `result` always present
/// - `Failure` → `{"jsonrpc":<version>,"error":<error>,"id":<id>}`
///
/// `version` is whatever the peer sent in `jsonrpc`, so a re-serialized
/// response carries the peer's version string. A response without the
/// member reads as "2.0". Responses built locally always use "2.0".
///
/// # Examples
///
/// ```rust
/// use sockrpc_core::Response;
/// use serde_json::Value;
///
/// let response: Response = serde_json::from_str(r#"{"jsonrpc":"2.0","id":1}"#).unwrap();
/// assert_eq!(response, Response::success(Value::Null, Some(1)));
/// assert_eq!(
///     serde_json::to_string(&response).unwrap(),
///     r#"{"jsonrpc":"2.0","result":null,"id":1}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// The call succeeded
    Success {
        /// Protocol version as received
        version: String,
        /// Echoed request id
        id: Option<u64>,
        /// Method result, possibly `null`
        result: Value,
    },
    /// The remote service reported an error
    Failure {
        /// Protocol version as received
        version: String,
        /// Echoed request id
        id: Option<u64>,
        /// The error object
        error: ErrorObject,
    },
}

impl Response {
    /// Build a success response
    pub fn success(result: Value, id: Option<u64>) -> Self {
        Response::Success {
            version: JSONRPC_VERSION.to_string(),
            id,
            result,
        }
    }

    /// Build a failure response
    pub fn failure(error: ErrorObject, id: Option<u64>) -> Self {
        Response::Failure {
            version: JSONRPC_VERSION.to_string(),
            id,
            error,
        }
    }

    /// The protocol version the peer sent
    pub fn version(&self) -> &str {
        match self {
            Response::Success { version, .. } | Response::Failure { version, .. } => version,
        }
    }

    /// The echoed id
    pub fn id(&self) -> Option<u64> {
        match self {
            Response::Success { id, .. } | Response::Failure { id, .. } => *id,
        }
    }

    /// True for `Success`
    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }

    /// True for `Failure`
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Failure { .. })
    }

    /// Split into the result or the error object
    pub fn into_result(self) -> std::result::Result<Value, ErrorObject> {
        match self {
            Response::Success { result, .. } => Ok(result),
            Response::Failure { error, .. } => Err(error),
        }
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("jsonrpc", self.version())?;
        match self {
            Response::Success { id, result, .. } => {
                map.serialize_entry("result", result)?;
                map.serialize_entry("id", id)?;
            }
            Response::Failure { id, error, .. } => {
                map.serialize_entry("error", error)?;
                map.serialize_entry("id", id)?;
            }
        }
        map.end()
    }
}

/// Raw response members as they appear on the wire
#[derive(Deserialize)]
struct WireResponse {
    #[serde(default = "default_version")]
    jsonrpc: String,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ErrorObject>,
    #[serde(default)]
    id: Option<Value>,
}

fn default_version() -> String {
    JSONRPC_VERSION.to_string()
}

/// Integer ids only; negatives are reinterpreted as unsigned
fn wire_id<E: de::Error>(id: Option<Value>) -> std::result::Result<Option<u64>, E> {
    match id {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match n.as_u64().or_else(|| n.as_i64().map(|id| id as u64)) {
            Some(id) => Ok(Some(id)),
            None => Err(E::invalid_value(Unexpected::Other("non-integer number"), &"an integer id")),
        },
        Some(other) => Err(E::invalid_type(Unexpected::Other(json_kind(&other)), &"an integer id")),
    }
}

impl<'de> Deserialize<'de> for Response {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let wire = WireResponse::deserialize(deserializer)?;
        let id = wire_id(wire.id)?;
        Ok(match wire.error {
            Some(error) => Response::Failure {
                version: wire.jsonrpc,
                id,
                error,
            },
            None => Response::Success {
                version: wire.jsonrpc,
                id,
                result: wire.result.unwrap_or(Value::Null),
            },
        })
    }
}
