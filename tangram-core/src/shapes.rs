use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::TangramError;
use crate::geometry::Point;

/// Colour of the target silhouette when the catalogue does not name one.
pub const TARGET_COLOUR: &str = "#333333";

/// Fixed colour-blind friendly palette; cycles by index.
pub fn piece_color(i: usize) -> String {
    const PALETTE: [&str; 4] = [
        "#88CCEE", // light blue
        "#117733", // green
        "#332288", // indigo
        "#44AA99", // teal
    ];
    PALETTE[i % PALETTE.len()].to_string()
}

/// A polygon in shape-local coordinates.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeDef {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub colour: Option<String>,
    /// Offset of the bounding box centre from the tray centre, before scaling.
    #[serde(default)]
    pub home: Option<[f64; 2]>,
    pub points: Vec<[f64; 2]>,
}

impl ShapeDef {
    pub fn vertices(&self) -> Vec<Point> {
        self.points.iter().map(|&p| p.into()).collect()
    }

    pub fn home_offset(&self) -> Point {
        self.home.map(Point::from).unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapesCatalog {
    pub target: ShapeDef,
    pub pieces: Vec<ShapeDef>,
}

impl ShapesCatalog {
    /// The letter-T puzzle bundled with the game.
    pub fn builtin() -> Self {
        match Self::from_json(include_str!("../../shapes.json")) {
            Ok(c) => c,
            Err(e) => {
                warn!("embedded shapes.json rejected: {e}");
                Self::default()
            }
        }
    }

    pub fn from_json(text: &str) -> Result<Self, TangramError> {
        let mut catalog: ShapesCatalog = serde_json::from_str(text)?;
        catalog.validate()?;
        if catalog.target.colour.is_none() {
            catalog.target.colour = Some(TARGET_COLOUR.to_string());
        }
        for (i, def) in catalog.pieces.iter_mut().enumerate() {
            if def.colour.is_none() {
                def.colour = Some(piece_color(i));
            }
        }
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), TangramError> {
        if self.pieces.is_empty() {
            return Err(TangramError::NoPieces);
        }
        for def in std::iter::once(&self.target).chain(self.pieces.iter()) {
            if def.points.len() < 3 {
                return Err(TangramError::DegenerateShape {
                    id: def.id.clone(),
                    count: def.points.len(),
                });
            }
        }
        Ok(())
    }

    pub fn piece(&self, id: &str) -> Option<&ShapeDef> {
        self.pieces.iter().find(|d| d.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.pieces.iter().position(|d| d.id == id)
    }
}
