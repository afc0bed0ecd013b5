// SPDX-FileCopyrightText: 2026 Figrelay Contributors
// SPDX-License-Identifier: MIT

//! Operation dispatcher.
//!
//! Translates a named, schema-validated tool invocation into a plugin-directed operation and
//! broadcasts it to the pool. Validation failures are returned synchronously with no broadcast.
//! Two execution shapes exist and are fixed per tool: the creation tools reply as soon as the
//! broadcast succeeds ("fire and report dispatch"); everything else arms the correlator and
//! replies only once the plugin confirms or the timeout elapses.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::bridge::types::RpcError;
use crate::correlate::{AwaitKind, Correlator, Outcome};
use crate::figma::FigmaClient;
use crate::pool::PluginPool;
use crate::tools::icons;
use crate::tools::types::*;
use crate::wire::{Color, Operation, PluginEvent, TextResizeMode};

/// Uniform wait for plugin confirmation.
pub const OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Default font family for created text.
pub const DEFAULT_FONT_FAMILY: &str = "Inter";

const DEFAULT_ICON_SIZE: f64 = 24.0;
const DEFAULT_ICON_STROKE_WIDTH: f64 = 2.0;
const DEFAULT_LINE_THICKNESS: f64 = 1.0;

/// Successful tool outcome; the front-end wraps it into a `tools/call` result.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolReply {
    pub text: String,
}

impl ToolReply {
    fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    pool: Arc<PluginPool>,
    correlator: Arc<Correlator>,
    figma: Arc<FigmaClient>,
}

impl Dispatcher {
    pub fn new(pool: Arc<PluginPool>, correlator: Arc<Correlator>, figma: Arc<FigmaClient>) -> Self {
        Self { pool, correlator, figma }
    }

    /// Executes one `tools/call`. `request_id` is the JSON-RPC id of the originating request,
    /// carried for logging only — the plugin wire protocol cannot transport it.
    pub async fn dispatch(
        &self,
        request_id: &Value,
        tool: &str,
        args: Value,
    ) -> Result<ToolReply, RpcError> {
        match tool {
            "addNumbersTool" => {
                let params: AddNumbersParams = parse(tool, args)?;
                let sum = params.a + params.b;
                Ok(ToolReply::new(format!("Sum of {} + {} = {}", params.a, params.b, sum)))
            }
            "figma.getFile" => {
                let params: GetFileParams = parse(tool, args)?;
                let file = self
                    .figma
                    .get_file(&params.file_id)
                    .await
                    .map_err(|err| RpcError::internal_error(err.to_string()))?;
                Ok(ToolReply::new(
                    serde_json::to_string_pretty(&file).unwrap_or_else(|_| file.to_string()),
                ))
            }
            "figma.createRectangle" => {
                let params: CreateRectangleParams = parse(tool, args)?;
                self.fire(&Operation::CreateRectangle {
                    position: params.position,
                    size: params.size,
                    color: params.color.unwrap_or(Color::SHAPE_DEFAULT),
                })
            }
            "figma.createText" => {
                let params: CreateTextParams = parse(tool, args)?;
                self.fire(&Operation::CreateText {
                    text: params.text,
                    position: params.position,
                    font_size: params.font_size,
                    color: params.color.unwrap_or(Color::TEXT_DEFAULT),
                    font_family: params
                        .font_family
                        .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_owned()),
                    resize_mode: params.resize_mode.unwrap_or(TextResizeMode::AutoWidth),
                })
            }
            "figma.createPage" => {
                let params: CreatePageParams = parse(tool, args)?;
                self.fire(&Operation::CreatePage {
                    page_name: params.page_name,
                    description: params.description,
                    style_guide: params.style_guide,
                })
            }
            "figma.selectNode" => {
                let params: SelectNodeParams = parse(tool, args)?;
                let op = Operation::SelectNode { node_id: params.node_id };
                self.fire_and_await(request_id, &op, AwaitKind::Report { operation: "select-node" })
                    .await
            }
            "figma.changeColor" => {
                let params: ChangeColorParams = parse(tool, args)?;
                let op = Operation::ChangeColor { color: params.color, node_id: params.node_id };
                self.fire_and_await(request_id, &op, AwaitKind::Report { operation: "change-color" })
                    .await
            }
            "figma.changeRadius" => {
                let params: ChangeRadiusParams = parse(tool, args)?;
                let op = Operation::ChangeRadius { radius: params.radius, node_id: params.node_id };
                self.fire_and_await(request_id, &op, AwaitKind::Report { operation: "change-radius" })
                    .await
            }
            "figma.changeTypeface" => {
                let params: ChangeTypefaceParams = parse(tool, args)?;
                let op = Operation::ChangeTypeface {
                    font_family: params.font_family,
                    node_id: params.node_id,
                };
                self.fire_and_await(
                    request_id,
                    &op,
                    AwaitKind::Report { operation: "change-typeface" },
                )
                .await
            }
            "figma.changeFontStyle" => {
                let params: ChangeFontStyleParams = parse(tool, args)?;
                let op = Operation::ChangeFontStyle {
                    font_size: params.font_size,
                    font_weight: params.font_weight,
                    italic: params.italic,
                    node_id: params.node_id,
                };
                self.fire_and_await(
                    request_id,
                    &op,
                    AwaitKind::Report { operation: "change-font-style" },
                )
                .await
            }
            "figma.changeAlignment" => {
                let params: ChangeAlignmentParams = parse(tool, args)?;
                let op = Operation::ChangeAlignment {
                    horizontal: params.horizontal,
                    vertical: params.vertical,
                    node_id: params.node_id,
                };
                self.fire_and_await(
                    request_id,
                    &op,
                    AwaitKind::Report { operation: "change-alignment" },
                )
                .await
            }
            "figma.changeSpacing" => {
                let params: ChangeSpacingParams = parse(tool, args)?;
                let op = Operation::ChangeSpacing {
                    padding: params.padding,
                    item_spacing: params.item_spacing,
                    node_id: params.node_id,
                };
                self.fire_and_await(
                    request_id,
                    &op,
                    AwaitKind::Report { operation: "change-spacing" },
                )
                .await
            }
            "figma.listFonts" => {
                let _params: ListFontsParams = parse(tool, args)?;
                self.fire_and_await(request_id, &Operation::ListFonts, AwaitKind::FontsList).await
            }
            "figma.changeTextResize" => {
                let params: ChangeTextResizeParams = parse(tool, args)?;
                let op = Operation::ChangeTextResize {
                    resize_mode: params.resize_mode,
                    width: params.width,
                    height: params.height,
                    node_id: params.node_id,
                };
                self.fire_and_await(
                    request_id,
                    &op,
                    AwaitKind::Report { operation: "change-text-resize" },
                )
                .await
            }
            "figma.listNodes" => {
                let params: ListNodesParams = parse(tool, args)?;
                let op = Operation::ListNodes {
                    include_details: params.include_details.unwrap_or(false),
                };
                self.fire_and_await(request_id, &op, AwaitKind::NodesList).await
            }
            "figma.deleteNode" => {
                let params: DeleteNodeParams = parse(tool, args)?;
                let op = Operation::DeleteNode { node_id: params.node_id };
                self.fire_and_await(request_id, &op, AwaitKind::NodesDeleted).await
            }
            "figma.moveNode" => {
                let params: MoveNodeParams = parse(tool, args)?;
                let op = Operation::MoveNode { position: params.position, node_id: params.node_id };
                self.fire_and_await(request_id, &op, AwaitKind::NodesMoved).await
            }
            "figma.createIcon" => {
                let params: CreateIconParams = parse(tool, args)?;
                let (resolved, substituted) = icons::resolve(&params.icon_name);
                let reply = self.fire(&Operation::CreateIcon {
                    icon_name: resolved.to_owned(),
                    position: params.position,
                    size: params.size.unwrap_or(DEFAULT_ICON_SIZE),
                    color: params.color.unwrap_or(Color::SHAPE_DEFAULT),
                    stroke_width: params.stroke_width.unwrap_or(DEFAULT_ICON_STROKE_WIDTH),
                })?;
                if substituted {
                    Ok(ToolReply::new(format!(
                        "Icon \"{}\" is not in the catalog; substituted placeholder \"{}\". {}",
                        params.icon_name, resolved, reply.text
                    )))
                } else {
                    Ok(reply)
                }
            }
            "figma.createBorderBox" => {
                let params: CreateBorderBoxParams = parse(tool, args)?;
                self.fire(&Operation::CreateBorderBox {
                    position: params.position,
                    size: params.size,
                    options: params.options,
                })
            }
            "figma.drawLine" => {
                let params: DrawLineParams = parse(tool, args)?;
                self.fire(&Operation::DrawLine {
                    start: params.start,
                    end: params.end,
                    color: params.color.unwrap_or(Color::SHAPE_DEFAULT),
                    thickness: params.thickness.unwrap_or(DEFAULT_LINE_THICKNESS),
                })
            }
            _ => Err(RpcError::invalid_params(format!("unknown tool: {tool}"))),
        }
    }

    /// Fire-and-report shape: success means the operation was handed to the pool, not that the
    /// plugin executed it.
    fn fire(&self, op: &Operation) -> Result<ToolReply, RpcError> {
        let delivered = self.send(op)?;
        Ok(ToolReply::new(format!(
            "{} dispatched to {delivered} plugin client(s)",
            op.name()
        )))
    }

    /// Fire-and-await shape: arms the correlator before broadcasting so a fast plugin reply
    /// cannot be missed, then maps the outcome.
    async fn fire_and_await(
        &self,
        request_id: &Value,
        op: &Operation,
        kind: AwaitKind,
    ) -> Result<ToolReply, RpcError> {
        if self.pool.is_empty() {
            return Err(no_plugin_error(op.name()));
        }
        let pending = self.correlator.arm(request_id, kind);
        self.send(op)?;
        debug!(request_id = %request_id, operation = op.name(), "awaiting plugin outcome");

        match pending.wait(OPERATION_TIMEOUT).await {
            Outcome::Event(PluginEvent::OperationCompleted { result, message, .. }) => {
                let base = message.unwrap_or_else(|| format!("{} completed", op.name()));
                match result {
                    Some(payload) => Ok(ToolReply::new(format!(
                        "{base}\n{}",
                        serde_json::to_string_pretty(&payload)
                            .unwrap_or_else(|_| payload.to_string())
                    ))),
                    None => Ok(ToolReply::new(base)),
                }
            }
            Outcome::Event(PluginEvent::OperationError { error, .. }) => {
                Err(plugin_failure(op.name(), &error))
            }
            Outcome::Event(
                PluginEvent::FontsList { fonts: payload }
                | PluginEvent::NodesList { nodes: payload }
                | PluginEvent::NodesDeleted { nodes: payload }
                | PluginEvent::NodesMoved { nodes: payload },
            ) => Ok(ToolReply::new(
                serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string()),
            )),
            Outcome::Event(PluginEvent::PluginReady { .. }) => Err(RpcError::internal_error(
                format!("unexpected plugin message while waiting for {}", op.name()),
            )),
            Outcome::TimedOut => Err(timeout_failure(op.name())),
        }
    }

    fn send(&self, op: &Operation) -> Result<usize, RpcError> {
        if self.pool.is_empty() {
            return Err(no_plugin_error(op.name()));
        }
        self.pool.broadcast(op).map_err(|err| RpcError::internal_error(err.to_string()))
    }
}

fn parse<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, RpcError> {
    serde_json::from_value(args)
        .map_err(|err| RpcError::invalid_params(format!("invalid arguments for {tool}: {err}")))
}

fn no_plugin_error(operation: &str) -> RpcError {
    RpcError::internal_error(format!("no plugin connected to execute {operation}")).with_data(
        json!({
            "operation": operation,
            "hint": "open the relay plugin inside the design tool so it can connect",
        }),
    )
}

/// Operations that address a node by id; their failures get remediation guidance.
fn addresses_node(operation: &str) -> bool {
    matches!(
        operation,
        "select-node"
            | "change-color"
            | "change-radius"
            | "change-typeface"
            | "change-font-style"
            | "change-alignment"
            | "change-spacing"
            | "change-text-resize"
            | "delete-node"
            | "move-node"
    )
}

fn plugin_failure(operation: &str, error: &str) -> RpcError {
    let mut data = json!({"originalOperation": operation});
    if addresses_node(operation) {
        data["hint"] = json!(
            "No matching node may be selected; call figma.listNodes to enumerate available \
             node ids, then retry with an explicit nodeId."
        );
    }
    RpcError::internal_error(format!("plugin failed to execute {operation}: {error}"))
        .with_data(data)
}

fn timeout_failure(operation: &str) -> RpcError {
    RpcError::internal_error(format!(
        "timed out after {} ms waiting for the plugin to report {operation}",
        OPERATION_TIMEOUT.as_millis()
    ))
    .with_data(json!({
        "originalOperation": operation,
        "timeoutMs": OPERATION_TIMEOUT.as_millis() as u64,
    }))
}
