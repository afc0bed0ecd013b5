// SPDX-FileCopyrightText: 2026 Figrelay Contributors
// SPDX-License-Identifier: MIT

//! Parameter shapes for every tool in the catalog.
//!
//! The agent's request shapes are a fixed contract: required fields are plain fields, optional
//! fields are `Option`s, and the generated JSON schema mirrors exactly that. Field names are
//! camelCase on the wire.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::wire::{
    BorderBoxOptions, Color, HorizontalAlign, Position, Size, TextResizeMode, VerticalAlign,
};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddNumbersParams {
    pub a: f64,
    pub b: f64,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetFileParams {
    pub file_id: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRectangleParams {
    pub position: Position,
    pub size: Size,
    pub color: Option<Color>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTextParams {
    pub text: String,
    pub position: Position,
    pub font_size: Option<f64>,
    pub color: Option<Color>,
    pub font_family: Option<String>,
    pub resize_mode: Option<TextResizeMode>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePageParams {
    pub page_name: String,
    pub description: String,
    pub style_guide: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectNodeParams {
    pub node_id: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeColorParams {
    pub color: Color,
    pub node_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRadiusParams {
    pub radius: f64,
    pub node_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeTypefaceParams {
    pub font_family: String,
    pub node_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeFontStyleParams {
    pub font_size: Option<f64>,
    pub font_weight: Option<u32>,
    pub italic: Option<bool>,
    pub node_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeAlignmentParams {
    pub horizontal: Option<HorizontalAlign>,
    pub vertical: Option<VerticalAlign>,
    pub node_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSpacingParams {
    pub padding: Option<f64>,
    pub item_spacing: Option<f64>,
    pub node_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListFontsParams {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeTextResizeParams {
    pub resize_mode: TextResizeMode,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub node_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListNodesParams {
    pub include_details: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteNodeParams {
    pub node_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveNodeParams {
    pub position: Position,
    pub node_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIconParams {
    pub icon_name: String,
    pub position: Position,
    pub size: Option<f64>,
    pub color: Option<Color>,
    pub stroke_width: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBorderBoxParams {
    pub position: Position,
    pub size: Size,
    pub options: BorderBoxOptions,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DrawLineParams {
    pub start: Position,
    pub end: Position,
    pub color: Option<Color>,
    pub thickness: Option<f64>,
}
