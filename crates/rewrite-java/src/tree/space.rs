//! Formatting carried between syntax elements.

/// Verbatim whitespace and comments preceding an element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Space {
    pub whitespace: String,
}

impl Space {
    pub const EMPTY: Space = Space {
        whitespace: String::new(),
    };

    pub fn format(whitespace: impl Into<String>) -> Self {
        Self {
            whitespace: whitespace.into(),
        }
    }

    pub fn single_space() -> Self {
        Self::format(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.whitespace.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.whitespace
    }

    /// Any `//` or `/* */` comment inside this space
    pub fn has_comment(&self) -> bool {
        self.whitespace.contains("//") || self.whitespace.contains("/*")
    }
}

/// An element followed by the space before its trailing delimiter
#[derive(Debug, Clone, PartialEq)]
pub struct RightPadded<T> {
    pub element: T,
    pub after: Space,
}

impl<T> RightPadded<T> {
    pub fn new(element: T, after: Space) -> Self {
        Self { element, after }
    }

    pub fn build(element: T) -> Self {
        Self::new(element, Space::EMPTY)
    }

    pub fn with_element(&self, element: T) -> Self {
        Self {
            element,
            after: self.after.clone(),
        }
    }
}

/// An element preceded by a delimiter and the space before it
#[derive(Debug, Clone, PartialEq)]
pub struct LeftPadded<T> {
    pub before: Space,
    pub element: T,
}

impl<T> LeftPadded<T> {
    pub fn new(before: Space, element: T) -> Self {
        Self { before, element }
    }

    pub fn with_element(&self, element: T) -> Self {
        Self {
            before: self.before.clone(),
            element,
        }
    }
}

/// A delimited, separated list such as method arguments. An empty list holds
/// a single `Empty` element so the space inside the delimiters survives.
#[derive(Debug, Clone, PartialEq)]
pub struct Container<T> {
    pub before: Space,
    pub elements: Vec<RightPadded<T>>,
}

impl<T> Container<T> {
    pub fn new(before: Space, elements: Vec<RightPadded<T>>) -> Self {
        Self { before, elements }
    }

    pub fn with_elements(&self, elements: Vec<RightPadded<T>>) -> Self {
        Self {
            before: self.before.clone(),
            elements,
        }
    }
}
