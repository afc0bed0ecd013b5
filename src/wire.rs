// SPDX-FileCopyrightText: 2026 Figrelay Contributors
// SPDX-License-Identifier: MIT

//! Plugin wire protocol.
//!
//! Both directions speak JSON text frames tagged with a kebab-case `type` field and camelCase
//! payload fields. Server→plugin frames are [`Operation`]s; plugin→server frames are
//! [`PluginEvent`]s. The plugin protocol carries no request identifiers: an outcome report only
//! names the operation it was executing, which is why correlation is approximate (see
//! `crate::correlate`).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// RGB color with channels in `0.0..=1.0`; alpha is optional and omitted when absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<f64>,
}

impl Color {
    /// Default fill for shape-creation operations.
    pub const SHAPE_DEFAULT: Color = Color { r: 0.8, g: 0.8, b: 0.8, a: None };
    /// Default fill for text-creation operations.
    pub const TEXT_DEFAULT: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: None };
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TextResizeMode {
    #[default]
    AutoWidth,
    AutoHeight,
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum VerticalAlign {
    Top,
    Middle,
    Bottom,
}

/// Per-side border description for `create-border-box`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorderSide {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorderBoxOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<BorderSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<BorderSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<BorderSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<BorderSide>,
}

/// Server→plugin frame: one instruction against the live document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Operation {
    ServerReady,
    CreateRectangle {
        position: Position,
        size: Size,
        color: Color,
    },
    CreateText {
        text: String,
        position: Position,
        #[serde(skip_serializing_if = "Option::is_none")]
        font_size: Option<f64>,
        color: Color,
        font_family: String,
        resize_mode: TextResizeMode,
    },
    CreatePage {
        page_name: String,
        description: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        style_guide: Option<String>,
    },
    SelectNode {
        node_id: String,
    },
    ChangeColor {
        color: Color,
        #[serde(skip_serializing_if = "Option::is_none")]
        node_id: Option<String>,
    },
    ChangeRadius {
        radius: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        node_id: Option<String>,
    },
    ChangeTypeface {
        font_family: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        node_id: Option<String>,
    },
    ChangeFontStyle {
        #[serde(skip_serializing_if = "Option::is_none")]
        font_size: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        font_weight: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        italic: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        node_id: Option<String>,
    },
    ChangeAlignment {
        #[serde(skip_serializing_if = "Option::is_none")]
        horizontal: Option<HorizontalAlign>,
        #[serde(skip_serializing_if = "Option::is_none")]
        vertical: Option<VerticalAlign>,
        #[serde(skip_serializing_if = "Option::is_none")]
        node_id: Option<String>,
    },
    ChangeSpacing {
        #[serde(skip_serializing_if = "Option::is_none")]
        padding: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        item_spacing: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        node_id: Option<String>,
    },
    ListFonts,
    ChangeTextResize {
        resize_mode: TextResizeMode,
        #[serde(skip_serializing_if = "Option::is_none")]
        width: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        height: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        node_id: Option<String>,
    },
    ListNodes {
        include_details: bool,
    },
    DeleteNode {
        #[serde(skip_serializing_if = "Option::is_none")]
        node_id: Option<String>,
    },
    MoveNode {
        position: Position,
        #[serde(skip_serializing_if = "Option::is_none")]
        node_id: Option<String>,
    },
    CreateIcon {
        icon_name: String,
        position: Position,
        size: f64,
        color: Color,
        stroke_width: f64,
    },
    CreateBorderBox {
        position: Position,
        size: Size,
        options: BorderBoxOptions,
    },
    DrawLine {
        start: Position,
        end: Position,
        color: Color,
        thickness: f64,
    },
}

impl Operation {
    /// Wire tag of this operation; also the value the plugin echoes back as `originalOperation`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ServerReady => "server-ready",
            Self::CreateRectangle { .. } => "create-rectangle",
            Self::CreateText { .. } => "create-text",
            Self::CreatePage { .. } => "create-page",
            Self::SelectNode { .. } => "select-node",
            Self::ChangeColor { .. } => "change-color",
            Self::ChangeRadius { .. } => "change-radius",
            Self::ChangeTypeface { .. } => "change-typeface",
            Self::ChangeFontStyle { .. } => "change-font-style",
            Self::ChangeAlignment { .. } => "change-alignment",
            Self::ChangeSpacing { .. } => "change-spacing",
            Self::ListFonts => "list-fonts",
            Self::ChangeTextResize { .. } => "change-text-resize",
            Self::ListNodes { .. } => "list-nodes",
            Self::DeleteNode { .. } => "delete-node",
            Self::MoveNode { .. } => "move-node",
            Self::CreateIcon { .. } => "create-icon",
            Self::CreateBorderBox { .. } => "create-border-box",
            Self::DrawLine { .. } => "draw-line",
        }
    }
}

/// Plugin→server frame.
///
/// Payload fields are kept loose (`Value`) and forwarded verbatim: their exact shape belongs to
/// the plugin sandbox, not to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum PluginEvent {
    PluginReady {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<String>,
    },
    OperationCompleted {
        original_operation: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    OperationError {
        original_operation: String,
        error: String,
    },
    NodesDeleted {
        #[serde(default)]
        nodes: Value,
    },
    NodesMoved {
        #[serde(default)]
        nodes: Value,
    },
    FontsList {
        #[serde(default)]
        fonts: Value,
    },
    NodesList {
        #[serde(default)]
        nodes: Value,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn operation_serializes_with_kebab_tag_and_camel_fields() {
        let op = Operation::CreateRectangle {
            position: Position { x: 10.0, y: 20.0 },
            size: Size { width: 100.0, height: 50.0 },
            color: Color::SHAPE_DEFAULT,
        };
        let value = serde_json::to_value(&op).expect("serialize");
        assert_eq!(
            value,
            json!({
                "type": "create-rectangle",
                "position": {"x": 10.0, "y": 20.0},
                "size": {"width": 100.0, "height": 50.0},
                "color": {"r": 0.8, "g": 0.8, "b": 0.8},
            })
        );
    }

    #[test]
    fn optional_fields_are_omitted() {
        let op = Operation::ChangeColor { color: Color::TEXT_DEFAULT, node_id: None };
        let value = serde_json::to_value(&op).expect("serialize");
        assert_eq!(value, json!({"type": "change-color", "color": {"r": 0.0, "g": 0.0, "b": 0.0}}));

        let op = Operation::DeleteNode { node_id: Some("1:23".to_owned()) };
        let value = serde_json::to_value(&op).expect("serialize");
        assert_eq!(value, json!({"type": "delete-node", "nodeId": "1:23"}));
    }

    #[test]
    fn resize_mode_uses_kebab_case() {
        let op = Operation::ChangeTextResize {
            resize_mode: TextResizeMode::AutoWidth,
            width: None,
            height: None,
            node_id: None,
        };
        let value = serde_json::to_value(&op).expect("serialize");
        assert_eq!(value["resizeMode"], json!("auto-width"));
    }

    #[test]
    fn operation_name_matches_wire_tag() {
        let ops = [
            Operation::ListFonts,
            Operation::SelectNode { node_id: "x".to_owned() },
            Operation::DrawLine {
                start: Position { x: 0.0, y: 0.0 },
                end: Position { x: 1.0, y: 1.0 },
                color: Color::SHAPE_DEFAULT,
                thickness: 1.0,
            },
        ];
        for op in ops {
            let value = serde_json::to_value(&op).expect("serialize");
            assert_eq!(value["type"], json!(op.name()));
        }
    }

    #[test]
    fn plugin_event_parses_operation_error() {
        let event: PluginEvent = serde_json::from_str(
            r#"{"type":"operation-error","originalOperation":"select-node","error":"not found"}"#,
        )
        .expect("parse");
        assert_eq!(
            event,
            PluginEvent::OperationError {
                original_operation: "select-node".to_owned(),
                error: "not found".to_owned(),
            }
        );
    }

    #[test]
    fn plugin_event_parses_typed_payloads() {
        let event: PluginEvent =
            serde_json::from_str(r#"{"type":"fonts-list","fonts":[{"family":"Inter"}]}"#)
                .expect("parse");
        assert_eq!(event, PluginEvent::FontsList { fonts: json!([{"family": "Inter"}]) });

        let event: PluginEvent =
            serde_json::from_str(r#"{"type":"nodes-deleted"}"#).expect("parse");
        assert_eq!(event, PluginEvent::NodesDeleted { nodes: Value::Null });
    }

    #[test]
    fn unknown_plugin_tag_is_a_parse_error() {
        let result = serde_json::from_str::<PluginEvent>(r#"{"type":"mystery"}"#);
        assert!(result.is_err());
    }
}
