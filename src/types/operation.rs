use crate::types::json_path::JsonPath;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct Operation {
    pub(crate) data: Value,

    #[serde(skip_serializing)]
    pub(crate) path: JsonPath,
}
