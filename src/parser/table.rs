/// Column header of an extracted table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    /// One label per column
    Flat(Vec<String>),
    /// `levels[level][column]`, outermost level first; every level has one label per column
    Levels(Vec<Vec<String>>),
}

impl Header {
    pub fn width(&self) -> usize {
        match self {
            Header::Flat(columns) => columns.len(),
            Header::Levels(levels) => levels.first().map_or(0, Vec::len),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Header::Flat(_) => 1,
            Header::Levels(levels) => levels.len(),
        }
    }
}

/// A table of string cells. Extraction yields a multi-level header; flattening and
/// renaming yield new tables with a flat header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    header: Header,
    rows: Vec<Vec<String>>,
}

/// Straight out of the extractor: two-level header, raw labels
pub type RawTable = Table;
/// Flat header, either the joined raw labels or the canonical names
pub type FlatTable = Table;

impl Table {
    pub fn new(header: Header, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Column names when the header is flat
    pub fn columns(&self) -> Option<&[String]> {
        match &self.header {
            Header::Flat(columns) => Some(columns),
            Header::Levels(_) => None,
        }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.header.width()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_parts(self) -> (Header, Vec<Vec<String>>) {
        (self.header, self.rows)
    }
}
