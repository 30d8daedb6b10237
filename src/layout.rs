//! Layout Module - Flexbox arrangement of the front-end panels
//!
//! Computes where each panel of the board lands in the terminal: the
//! input column on the left, the brick (screen, face buttons, status
//! light) in the middle, the motor column on the right. Taffy does the
//! flexbox math; this module only describes the tree and flattens the
//! result into absolute cell rectangles.

use taffy::{
    AvailableSpace, Dimension, FlexDirection, LengthPercentage, NodeId, Size, Style, TaffyError,
    TaffyTree,
};

use crate::types::PORT_COUNT;

// =============================================================================
// TYPES
// =============================================================================

/// One panel's cells, absolute in the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelRect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl PanelRect {
    /// Whether the rect has any drawable area.
    pub fn is_visible(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Where every panel of the board lives.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoardLayout {
    pub inputs: [PanelRect; PORT_COUNT],
    pub screen: PanelRect,
    pub buttons: PanelRect,
    pub light: PanelRect,
    pub motors: [PanelRect; PORT_COUNT],
    /// One-line status/help bar across the bottom.
    pub status: PanelRect,
}

// =============================================================================
// TREE
// =============================================================================

/// Width of the two device columns in cells.
const COLUMN_WIDTH: f32 = 26.0;

/// Height of the face-button block in cells.
const BUTTONS_HEIGHT: f32 = 5.0;

/// Height of the status-light row in cells.
const LIGHT_HEIGHT: f32 = 3.0;

fn cells(n: f32) -> Dimension {
    Dimension::Length(n)
}

fn column(tree: &mut TaffyTree, width: f32) -> Result<(NodeId, [NodeId; PORT_COUNT]), TaffyError> {
    let panels: [NodeId; PORT_COUNT] = [
        panel(tree)?,
        panel(tree)?,
        panel(tree)?,
        panel(tree)?,
    ];
    let node = tree.new_with_children(
        Style {
            flex_direction: FlexDirection::Column,
            size: Size {
                width: cells(width),
                height: Dimension::Auto,
            },
            flex_grow: 0.0,
            gap: Size {
                width: LengthPercentage::Length(0.0),
                height: LengthPercentage::Length(0.0),
            },
            ..Default::default()
        },
        &panels,
    )?;
    Ok((node, panels))
}

fn panel(tree: &mut TaffyTree) -> Result<NodeId, TaffyError> {
    tree.new_leaf(Style {
        flex_grow: 1.0,
        size: Size {
            width: Dimension::Percent(1.0),
            height: Dimension::Auto,
        },
        ..Default::default()
    })
}

/// Compute the board layout for a terminal of the given size.
pub fn compute_board_layout(width: u16, height: u16) -> Result<BoardLayout, TaffyError> {
    let mut tree: TaffyTree = TaffyTree::new();

    let (input_column, input_panels) = column(&mut tree, COLUMN_WIDTH)?;
    let (motor_column, motor_panels) = column(&mut tree, COLUMN_WIDTH)?;

    let screen = tree.new_leaf(Style {
        flex_grow: 1.0,
        ..Default::default()
    })?;
    let buttons = tree.new_leaf(Style {
        size: Size {
            width: Dimension::Percent(1.0),
            height: cells(BUTTONS_HEIGHT),
        },
        ..Default::default()
    })?;
    let light = tree.new_leaf(Style {
        size: Size {
            width: Dimension::Percent(1.0),
            height: cells(LIGHT_HEIGHT),
        },
        ..Default::default()
    })?;
    let brick_column = tree.new_with_children(
        Style {
            flex_direction: FlexDirection::Column,
            flex_grow: 1.0,
            ..Default::default()
        },
        &[screen, buttons, light],
    )?;

    let body = tree.new_with_children(
        Style {
            flex_direction: FlexDirection::Row,
            flex_grow: 1.0,
            size: Size {
                width: Dimension::Percent(1.0),
                height: Dimension::Auto,
            },
            ..Default::default()
        },
        &[input_column, brick_column, motor_column],
    )?;

    let status = tree.new_leaf(Style {
        size: Size {
            width: Dimension::Percent(1.0),
            height: cells(1.0),
        },
        ..Default::default()
    })?;

    let root = tree.new_with_children(
        Style {
            flex_direction: FlexDirection::Column,
            size: Size {
                width: cells(width as f32),
                height: cells(height as f32),
            },
            ..Default::default()
        },
        &[body, status],
    )?;

    tree.compute_layout(
        root,
        Size {
            width: AvailableSpace::Definite(width as f32),
            height: AvailableSpace::Definite(height as f32),
        },
    )?;

    // Taffy locations are parent-relative; flatten to absolute cells.
    let abs = |tree: &TaffyTree, node: NodeId, ox: f32, oy: f32| -> Result<PanelRect, TaffyError> {
        let layout = tree.layout(node)?;
        Ok(PanelRect {
            x: (ox + layout.location.x) as u16,
            y: (oy + layout.location.y) as u16,
            width: layout.size.width as u16,
            height: layout.size.height as u16,
        })
    };

    let body_rect = abs(&tree, body, 0.0, 0.0)?;
    let (bx, by) = (body_rect.x as f32, body_rect.y as f32);

    let input_rect = abs(&tree, input_column, bx, by)?;
    let brick_rect = abs(&tree, brick_column, bx, by)?;
    let motor_rect = abs(&tree, motor_column, bx, by)?;

    let mut layout = BoardLayout {
        screen: abs(&tree, screen, brick_rect.x as f32, brick_rect.y as f32)?,
        buttons: abs(&tree, buttons, brick_rect.x as f32, brick_rect.y as f32)?,
        light: abs(&tree, light, brick_rect.x as f32, brick_rect.y as f32)?,
        status: abs(&tree, status, 0.0, 0.0)?,
        ..Default::default()
    };
    for (i, node) in input_panels.into_iter().enumerate() {
        layout.inputs[i] = abs(&tree, node, input_rect.x as f32, input_rect.y as f32)?;
    }
    for (i, node) in motor_panels.into_iter().enumerate() {
        layout.motors[i] = abs(&tree, node, motor_rect.x as f32, motor_rect.y as f32)?;
    }

    Ok(layout)
}

// =============================================================================
// TESTS
// =============================================================================
