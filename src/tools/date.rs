use super::{NoArgs, Tool};
use crate::error::ToolError;
use chrono::Local;
use serde_json::{json, Value};

pub struct GetTodaysDateTool;

/// Current local date as `YYYY-MM-DD`.
pub fn todays_date() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

#[async_trait::async_trait]
impl Tool for GetTodaysDateTool {
    type Args = NoArgs;
    const NAME: &'static str = "get_todays_date";

    fn description(&self) -> &'static str {
        "Returns the current date"
    }

    async fn call(&self, _args: NoArgs) -> Result<Value, ToolError> {
        Ok(json!(todays_date()))
    }
}
