// SPDX-FileCopyrightText: 2026 Figrelay Contributors
// SPDX-License-Identifier: MIT

//! Tool catalog and dispatch.
//!
//! The catalog is a fixed enumerated array: every tool name, required/optional argument and
//! default is part of the agent-facing contract and must not drift. Schemas are derived from the
//! parameter structs in [`types`].

pub mod dispatch;
pub mod icons;
pub mod types;

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

pub use dispatch::{Dispatcher, ToolReply};

/// One entry of the static tool catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

fn schema_value<T: JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(T))
        .unwrap_or_else(|_| serde_json::json!({"type": "object"}))
}

fn descriptor<T: JsonSchema>(name: &'static str, description: &'static str) -> ToolDescriptor {
    ToolDescriptor { name, description, input_schema: schema_value::<T>() }
}

/// The full, fixed tool catalog in `tools/list` order.
pub fn catalog() -> Vec<ToolDescriptor> {
    use types::*;

    vec![
        descriptor::<AddNumbersParams>("addNumbersTool", "Add two numbers and return the sum."),
        descriptor::<GetFileParams>(
            "figma.getFile",
            "Fetch a Figma file's document metadata through the REST API.",
        ),
        descriptor::<CreateRectangleParams>(
            "figma.createRectangle",
            "Create a rectangle at a position with a size; color defaults to light gray.",
        ),
        descriptor::<CreateTextParams>(
            "figma.createText",
            "Create a text node; color defaults to black, font family to Inter, resize mode to auto-width.",
        ),
        descriptor::<CreatePageParams>(
            "figma.createPage",
            "Create a new page described by a name, a description and an optional style guide.",
        ),
        descriptor::<SelectNodeParams>("figma.selectNode", "Select a node by id."),
        descriptor::<ChangeColorParams>(
            "figma.changeColor",
            "Change the fill color of the addressed node (or the current selection).",
        ),
        descriptor::<ChangeRadiusParams>(
            "figma.changeRadius",
            "Change the corner radius of the addressed node (or the current selection).",
        ),
        descriptor::<ChangeTypefaceParams>(
            "figma.changeTypeface",
            "Change the font family of the addressed text node (or the current selection).",
        ),
        descriptor::<ChangeFontStyleParams>(
            "figma.changeFontStyle",
            "Change font size, weight or italic of the addressed text node.",
        ),
        descriptor::<ChangeAlignmentParams>(
            "figma.changeAlignment",
            "Change horizontal/vertical alignment of the addressed node.",
        ),
        descriptor::<ChangeSpacingParams>(
            "figma.changeSpacing",
            "Change padding and item spacing of the addressed auto-layout node.",
        ),
        descriptor::<ListFontsParams>("figma.listFonts", "List the fonts available to the document."),
        descriptor::<ChangeTextResizeParams>(
            "figma.changeTextResize",
            "Change the text resize mode of the addressed text node.",
        ),
        descriptor::<ListNodesParams>(
            "figma.listNodes",
            "List the nodes on the current page, optionally with details.",
        ),
        descriptor::<DeleteNodeParams>(
            "figma.deleteNode",
            "Delete the addressed node (or the current selection).",
        ),
        descriptor::<MoveNodeParams>(
            "figma.moveNode",
            "Move the addressed node (or the current selection) to a position.",
        ),
        descriptor::<CreateIconParams>(
            "figma.createIcon",
            "Place an icon from the bundled catalog; unknown names fall back to the placeholder.",
        ),
        descriptor::<CreateBorderBoxParams>(
            "figma.createBorderBox",
            "Create a box with per-side border options.",
        ),
        descriptor::<DrawLineParams>(
            "figma.drawLine",
            "Draw a line between two points; color defaults to light gray, thickness to 1.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn catalog_names_are_unique_and_stable() {
        let tools = catalog();
        assert_eq!(tools.len(), 20);

        let names: BTreeSet<&str> = tools.iter().map(|tool| tool.name).collect();
        assert_eq!(names.len(), tools.len());
        assert!(names.contains("addNumbersTool"));
        assert!(names.contains("figma.createRectangle"));
        assert!(names.contains("figma.drawLine"));
    }

    #[test]
    fn schemas_mark_required_and_optional_fields() {
        let tools = catalog();
        let rectangle = tools
            .iter()
            .find(|tool| tool.name == "figma.createRectangle")
            .expect("createRectangle");
        let required = rectangle.input_schema["required"]
            .as_array()
            .expect("required array")
            .iter()
            .filter_map(|value| value.as_str())
            .collect::<Vec<_>>();
        assert!(required.contains(&"position"));
        assert!(required.contains(&"size"));
        assert!(!required.contains(&"color"));

        let list_fonts =
            tools.iter().find(|tool| tool.name == "figma.listFonts").expect("listFonts");
        assert!(list_fonts.input_schema["required"].as_array().map_or(true, |r| r.is_empty()));
    }

    #[test]
    fn descriptors_serialize_with_camel_case_schema_key() {
        let tools = catalog();
        let value = serde_json::to_value(&tools[0]).expect("serialize");
        assert_eq!(value["name"], serde_json::json!("addNumbersTool"));
        assert!(value.get("inputSchema").is_some());
    }
}
