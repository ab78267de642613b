//! MCP adapter: exposes [`ToolManager`] operations as MCP tools.

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use tracing::warn;

use crate::error::CalendarError;
use crate::tools::{
    CalculateArgs, CheckAvailabilityArgs, CreateEventArgs, DeleteEventArgs, ListEventsArgs,
    SearchEventsArgs, ToolManager, UpdateEventArgs,
};

const INSTRUCTIONS: &str = "Google Calendar tools for AI agents. \
     All times are RFC3339 (e.g. 2024-07-22T09:00:00Z). \
     Use check_google_calendar to get an ordered list of free and busy slots covering a window, \
     then create_calendar_event inside a free slot. \
     list_calendar_events and search_calendar_events return event IDs for update_calendar_event \
     and delete_calendar_event.";

#[derive(Clone)]
pub struct CalendarServer {
    tools: Arc<ToolManager>,
    name: String,
    version: String,
    tool_router: ToolRouter<Self>,
}

fn success(text: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text)])
}

/// Tool failures are reported in-band so the agent can read and react to them.
fn failure(tool: &str, err: CalendarError) -> CallToolResult {
    warn!(tool, code = %err.code(), error = %err, "tool call failed");
    let body = serde_json::to_string_pretty(&err.to_response()).unwrap_or_else(|_| err.to_string());
    CallToolResult::error(vec![Content::text(body)])
}

fn respond(tool: &str, result: crate::error::Result<String>) -> Result<CallToolResult, McpError> {
    Ok(match result {
        Ok(text) => success(text),
        Err(err) => failure(tool, err),
    })
}

#[tool_router]
impl CalendarServer {
    pub fn new(tools: ToolManager, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            tools: Arc::new(tools),
            name: name.into(),
            version: version.into(),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Perform basic arithmetic operations")]
    async fn calculate(
        &self,
        Parameters(args): Parameters<CalculateArgs>,
    ) -> Result<CallToolResult, McpError> {
        Ok(match self.tools.calculate(args) {
            Ok(text) => success(text),
            Err(err) => {
                warn!(tool = "calculate", error = %err, "tool call failed");
                CallToolResult::error(vec![Content::text(err.to_string())])
            }
        })
    }

    #[tool(
        description = "Checks a Google Calendar for busy and free time slots within a specified time window. Returns an ordered list of slots covering the whole window, each marked free or busy."
    )]
    async fn check_google_calendar(
        &self,
        Parameters(args): Parameters<CheckAvailabilityArgs>,
    ) -> Result<CallToolResult, McpError> {
        respond("check_google_calendar", self.tools.check_availability(args).await)
    }

    #[tool(description = "Creates a new event in Google Calendar")]
    async fn create_calendar_event(
        &self,
        Parameters(args): Parameters<CreateEventArgs>,
    ) -> Result<CallToolResult, McpError> {
        respond("create_calendar_event", self.tools.create_event(args).await)
    }

    #[tool(description = "Lists events from Google Calendar within a specified time range")]
    async fn list_calendar_events(
        &self,
        Parameters(args): Parameters<ListEventsArgs>,
    ) -> Result<CallToolResult, McpError> {
        respond("list_calendar_events", self.tools.list_events(args).await)
    }

    #[tool(description = "Updates an existing event in Google Calendar")]
    async fn update_calendar_event(
        &self,
        Parameters(args): Parameters<UpdateEventArgs>,
    ) -> Result<CallToolResult, McpError> {
        respond("update_calendar_event", self.tools.update_event(args).await)
    }

    #[tool(description = "Deletes an event from Google Calendar")]
    async fn delete_calendar_event(
        &self,
        Parameters(args): Parameters<DeleteEventArgs>,
    ) -> Result<CallToolResult, McpError> {
        respond("delete_calendar_event", self.tools.delete_event(args).await)
    }

    #[tool(description = "Searches for events in Google Calendar by text query")]
    async fn search_calendar_events(
        &self,
        Parameters(args): Parameters<SearchEventsArgs>,
    ) -> Result<CallToolResult, McpError> {
        respond("search_calendar_events", self.tools.search_events(args).await)
    }

    #[tool(description = "Gets information about the configured Google Calendar")]
    async fn get_calendar_info(&self) -> Result<CallToolResult, McpError> {
        respond("get_calendar_info", self.tools.calendar_info().await)
    }
}

#[tool_handler]
impl ServerHandler for CalendarServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.name.clone(),
                version: self.version.clone(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(INSTRUCTIONS.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn text_of(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|c| c.as_text().map(|t| t.text.clone()))
            .collect()
    }

    #[test]
    fn server_info_reports_name_and_tools() {
        let server = CalendarServer::new(ToolManager::new(None), "google-calendar-mcp", "1.2.3");
        let info = server.get_info();
        assert_eq!(info.server_info.name, "google-calendar-mcp");
        assert_eq!(info.server_info.version, "1.2.3");
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn router_lists_every_tool() {
        let server = CalendarServer::new(ToolManager::new(None), "n", "v");
        let mut names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "calculate",
                "check_google_calendar",
                "create_calendar_event",
                "delete_calendar_event",
                "get_calendar_info",
                "list_calendar_events",
                "search_calendar_events",
                "update_calendar_event",
            ]
        );
    }

    #[tokio::test]
    async fn missing_service_is_reported_in_band() {
        let server = CalendarServer::new(ToolManager::new(None), "n", "v");
        let result = server.get_calendar_info().await.unwrap();
        assert_eq!(result.is_error, Some(true));
        let body: serde_json::Value = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(body["code"], ErrorCode::ServiceUnavailable.as_str());
        assert_eq!(body["type"], "INTERNAL_ERROR");
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Calendar service unavailable"));
    }

    #[tokio::test]
    async fn calculator_works_without_calendar() {
        let server = CalendarServer::new(ToolManager::new(None), "n", "v");
        let args: CalculateArgs =
            serde_json::from_value(serde_json::json!({"operation": "multiply", "x": 3, "y": 4}))
                .unwrap();
        let result = server.calculate(Parameters(args)).await.unwrap();
        assert_eq!(result.is_error, Some(false));
        assert_eq!(text_of(&result), "12.00");

        let args: CalculateArgs =
            serde_json::from_value(serde_json::json!({"operation": "divide", "x": 1, "y": 0}))
                .unwrap();
        let result = server.calculate(Parameters(args)).await.unwrap();
        assert_eq!(result.is_error, Some(true));
        assert_eq!(text_of(&result), "cannot divide by zero");
    }
}
