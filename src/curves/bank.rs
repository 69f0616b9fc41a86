//! The fixed set of eight preset curve shapes.

use log::{debug, warn};

use super::bezier::CubicBezier;
use super::table::{CurveTable, TABLE_LEN};
use crate::{CurveError, bezier};

/// Vertical resolution of [`CurveBank::default`], matching a 12-bit DAC.
pub const DEFAULT_VERTICAL_RESOLUTION: u32 = 4095;

/// One of the eight preset curve shapes a phase can follow.
///
/// Every preset is a falling Bézier; attack phases read it backwards, so a
/// shape that decays quickly also attacks quickly. A curve designed as a
/// rising attack can take a preset's place through [`CurveBank::with_table`]:
///
/// ```
/// use contour::{CurveBank, CurveShape, CurveTable, bezier};
///
/// let punchy = bezier!(rising: (210, 1700), (620, 3970));
/// let table = CurveTable::from_bezier(&punchy, 4095, 1024)?;
/// let bank = CurveBank::default().with_table(CurveShape::Steep, table)?;
/// assert!(bank.table(CurveShape::Steep).rising(100) > 1500);
/// # Ok::<(), contour::CurveError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CurveShape {
    /// Gentle exponential-like curve.
    #[default]
    Soft,
    /// Slightly slower start than [`Soft`](Self::Soft).
    Gentle,
    /// Drops almost immediately, then a long tail.
    Steep,
    /// Holds high and falls late.
    Convex,
    /// Fast drop with a lifted tail.
    Aggressive,
    /// Rounded shoulder before the fall.
    Shoulder,
    /// Fast initial drop into a long plateau.
    Plateau,
    /// Symmetric S-curve.
    SCurve,
}

const PRESETS: [CubicBezier; CurveShape::COUNT] = [
    bezier!(falling: (250, 1500), (1500, 250)),
    bezier!(falling: (840, 1780), (1160, 210)),
    bezier!(falling: (400, 430), (920, 420)),
    bezier!(falling: (2170, 3610), (3730, 2610)),
    bezier!(falling: (400, 1380), (3830, 2890)),
    bezier!(falling: (1140, 3750), (1850, 1080)),
    bezier!(falling: (200, 2700), (720, 3050)),
    bezier!(falling: (0, 4095), (4095, 0)),
];

impl CurveShape {
    /// Number of shapes in the bank.
    pub const COUNT: usize = 8;

    /// Every shape, in bank order.
    pub const ALL: [CurveShape; Self::COUNT] = [
        CurveShape::Soft,
        CurveShape::Gentle,
        CurveShape::Steep,
        CurveShape::Convex,
        CurveShape::Aggressive,
        CurveShape::Shoulder,
        CurveShape::Plateau,
        CurveShape::SCurve,
    ];

    /// Position of this shape in the bank.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Looks up a shape by bank position.
    ///
    /// # Examples
    ///
    /// ```
    /// use contour::CurveShape;
    ///
    /// assert_eq!(CurveShape::from_index(2), Some(CurveShape::Steep));
    /// assert_eq!(CurveShape::from_index(8), None);
    /// ```
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Looks up a shape by bank position, clamping out-of-range positions to
    /// the last shape.
    pub fn from_index_clamped(index: usize) -> Self {
        Self::from_index(index).unwrap_or_else(|| {
            warn!(
                "curve index {} out of range, clamping to {}",
                index,
                Self::COUNT - 1
            );
            Self::ALL[Self::COUNT - 1]
        })
    }

    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            CurveShape::Soft => "soft",
            CurveShape::Gentle => "gentle",
            CurveShape::Steep => "steep",
            CurveShape::Convex => "convex",
            CurveShape::Aggressive => "aggressive",
            CurveShape::Shoulder => "shoulder",
            CurveShape::Plateau => "plateau",
            CurveShape::SCurve => "s-curve",
        }
    }

    /// The preset curve behind this shape, in design units.
    pub const fn bezier(self) -> CubicBezier {
        PRESETS[self as usize]
    }
}

/// Eight curve tables sharing one length and one vertical resolution.
///
/// Building a bank solves every preset curve, so it belongs in setup code.
/// Once built, a bank is immutable and can be shared by any number of
/// envelopes.
///
/// # Examples
///
/// ```
/// use contour::{CurveBank, CurveShape};
///
/// let bank = CurveBank::new(255, 256)?;
/// assert_eq!(bank.vertical_resolution(), 255);
/// assert_eq!(bank.table(CurveShape::Steep).len(), 256);
/// # Ok::<(), contour::CurveError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurveBank {
    tables: Vec<CurveTable>,
    vertical_resolution: u32,
    table_len: usize,
}

impl CurveBank {
    /// Builds the preset tables at the given vertical resolution and length.
    ///
    /// # Errors
    ///
    /// Returns an error if `table_len` is outside `2..=MAX_TABLE_LEN` or the
    /// vertical resolution is zero or wider than 16 bits.
    pub fn new(vertical_resolution: u32, table_len: usize) -> Result<Self, CurveError> {
        let tables = CurveShape::ALL
            .iter()
            .map(|shape| CurveTable::from_bezier(&shape.bezier(), vertical_resolution, table_len))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "built curve bank: {} tables of {} samples at level {}",
            tables.len(),
            table_len,
            vertical_resolution
        );

        Ok(Self {
            tables,
            vertical_resolution,
            table_len,
        })
    }

    /// Assembles a bank from custom tables, one per shape in bank order.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::BankMismatch`] unless every table has the same
    /// length and a maximum level equal to `vertical_resolution`.
    pub fn from_tables(
        vertical_resolution: u32,
        tables: [CurveTable; CurveShape::COUNT],
    ) -> Result<Self, CurveError> {
        let table_len = tables[0].len();
        for table in &tables {
            check_fit(table, vertical_resolution, table_len)?;
        }

        Ok(Self {
            tables: tables.into(),
            vertical_resolution,
            table_len,
        })
    }

    /// Replaces the table behind one shape.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::BankMismatch`] if the table's length or maximum
    /// level differ from the bank's.
    ///
    /// # Examples
    ///
    /// ```
    /// use contour::{CurveBank, CurveShape, CurveTable};
    ///
    /// let line = CurveTable::linear(4095, 1024)?;
    /// let bank = CurveBank::default().with_table(CurveShape::SCurve, line.clone())?;
    /// assert_eq!(bank.table(CurveShape::SCurve), &line);
    ///
    /// let short = CurveTable::linear(4095, 16)?;
    /// assert!(CurveBank::default().with_table(CurveShape::Soft, short).is_err());
    /// # Ok::<(), contour::CurveError>(())
    /// ```
    pub fn with_table(mut self, shape: CurveShape, table: CurveTable) -> Result<Self, CurveError> {
        check_fit(&table, self.vertical_resolution, self.table_len)?;
        self.tables[shape.index()] = table;
        Ok(self)
    }

    /// The table for `shape`.
    pub fn table(&self, shape: CurveShape) -> &CurveTable {
        &self.tables[shape.index()]
    }

    /// The table at a raw bank position, clamped into range.
    pub fn table_at(&self, index: usize) -> &CurveTable {
        self.table(CurveShape::from_index_clamped(index))
    }

    /// Samples per table.
    pub fn table_len(&self) -> usize {
        self.table_len
    }

    /// Maximum level of every table.
    pub fn vertical_resolution(&self) -> u32 {
        self.vertical_resolution
    }
}

impl Default for CurveBank {
    /// 4095 levels, 1024 samples per table.
    fn default() -> Self {
        let tables = CurveShape::ALL
            .iter()
            .map(|shape| {
                CurveTable::generate(
                    &shape.bezier(),
                    DEFAULT_VERTICAL_RESOLUTION as u16,
                    TABLE_LEN,
                )
            })
            .collect();

        debug!(
            "built default curve bank: {} samples at level {}",
            TABLE_LEN, DEFAULT_VERTICAL_RESOLUTION
        );

        Self {
            tables,
            vertical_resolution: DEFAULT_VERTICAL_RESOLUTION,
            table_len: TABLE_LEN,
        }
    }
}

fn check_fit(table: &CurveTable, vertical_resolution: u32, table_len: usize) -> Result<(), CurveError> {
    if table.len() != table_len || table.max() != vertical_resolution {
        return Err(CurveError::BankMismatch {
            len: table.len(),
            max: table.max(),
            bank_len: table_len,
            bank_max: vertical_resolution,
        });
    }
    Ok(())
}
