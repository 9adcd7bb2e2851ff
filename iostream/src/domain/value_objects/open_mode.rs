//! fopen-style mode string value object.

use core::fmt;
use core::str::FromStr;

/// A parsed fopen mode string (`"rb"`, `"w+"`, `"a"`, ...).
///
/// The base character selects the access pattern:
/// - `r`: open existing file for reading
/// - `w`: create or truncate for writing
/// - `a`: create or append for writing
///
/// followed by any of `+` (read and write), `b` (binary, no effect) and
/// `x` (fail if the file exists, only with `w`/`a`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenMode {
    read: bool,
    write: bool,
    append: bool,
    truncate: bool,
    create: bool,
    exclusive: bool,
}

impl OpenMode {
    /// Parse a mode string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty, starts with anything other
    /// than `r`, `w` or `a`, or contains an unknown modifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use iostream::OpenMode;
    ///
    /// let mode = OpenMode::parse("rb").unwrap();
    /// assert!(mode.is_readable());
    /// assert!(!mode.is_writable());
    ///
    /// let mode = OpenMode::parse("w+").unwrap();
    /// assert!(mode.is_readable() && mode.is_writable());
    /// ```
    pub fn parse(mode: &str) -> Result<Self, OpenModeError> {
        let mut chars = mode.chars();
        let mut parsed = match chars.next() {
            None => return Err(OpenModeError::Empty),
            Some('r') => Self {
                read: true,
                ..Self::default()
            },
            Some('w') => Self {
                write: true,
                create: true,
                truncate: true,
                ..Self::default()
            },
            Some('a') => Self {
                write: true,
                create: true,
                append: true,
                ..Self::default()
            },
            Some(other) => return Err(OpenModeError::InvalidAccess(other)),
        };

        for modifier in chars {
            match modifier {
                '+' => {
                    parsed.read = true;
                    parsed.write = true;
                }
                'b' => {}
                'x' if parsed.create => parsed.exclusive = true,
                other => return Err(OpenModeError::InvalidModifier(other)),
            }
        }

        Ok(parsed)
    }

    /// Whether the stream may be read.
    #[inline]
    pub const fn is_readable(&self) -> bool {
        self.read
    }

    /// Whether the stream may be written.
    #[inline]
    pub const fn is_writable(&self) -> bool {
        self.write
    }

    /// Whether every write goes to the end of the file.
    #[inline]
    pub const fn is_append(&self) -> bool {
        self.append
    }

    /// Build the matching `std::fs::OpenOptions`.
    pub fn to_open_options(&self) -> std::fs::OpenOptions {
        let mut options = std::fs::OpenOptions::new();
        options.read(self.read).write(self.write).append(self.append);
        if self.exclusive {
            options.create_new(true);
        } else {
            options.create(self.create).truncate(self.truncate);
        }
        options
    }
}

impl FromStr for OpenMode {
    type Err = OpenModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Errors that can occur when parsing an [`OpenMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenModeError {
    /// Mode string is empty.
    Empty,
    /// First character is not `r`, `w` or `a`.
    InvalidAccess(char),
    /// A trailing character is not a recognised modifier.
    InvalidModifier(char),
}

impl fmt::Display for OpenModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Mode string cannot be empty"),
            Self::InvalidAccess(c) => write!(f, "Mode must start with 'r', 'w' or 'a', found '{}'", c),
            Self::InvalidModifier(c) => write!(f, "Unknown mode modifier '{}'", c),
        }
    }
}

impl core::error::Error for OpenModeError {}
