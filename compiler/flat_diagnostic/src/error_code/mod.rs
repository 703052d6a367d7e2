use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E0xxx: Lexer errors
/// - E1xxx: Definition parser errors
/// - E2xxx: Type table, recursion, layout and vtable errors
/// - E3xxx: Expansion errors
/// - W3xxx: Soft warnings from the macro pass
/// - E9xxx: Internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lexer Errors (E0xxx)
    /// Unterminated string literal
    E0001,
    /// Line break inside string literal
    E0002,
    /// Unterminated template literal
    E0003,
    /// Unterminated block comment
    E0004,

    // Parser Errors (E1xxx)
    /// Expected `struct` or `class` after `@flatjs`
    E1001,
    /// Virtual method inside a struct
    E1002,
    /// Getter or setter outside a struct
    E1003,
    /// Non-get/set method inside a struct
    E1004,
    /// Malformed field declaration
    E1005,
    /// End of input inside a definition or method body
    E1006,
    /// Unbalanced brackets in a method body
    E1007,
    /// Duplicate getter or setter
    E1008,
    /// Malformed method signature
    E1009,
    /// Duplicate member name
    E1010,
    /// Unexpected token
    E1011,

    // Type Errors (E2xxx)
    /// Duplicate type name
    E2001,
    /// Unknown field type
    E2002,
    /// Unknown base class
    E2003,
    /// Base type is not a class
    E2004,
    /// Qualifier not supported by type
    E2005,
    /// Struct contains itself by value
    E2006,
    /// Inheritance cycle
    E2007,
    /// Duplicate class id
    E2008,
    /// Class name not hashable
    E2009,
    /// Field redeclares an inherited field
    E2010,
    /// Non-virtual method shadows an inherited virtual
    E2011,

    // Expansion Errors (E3xxx)
    /// Unknown member in self reference
    E3001,
    /// Operation not applicable to field
    E3002,
    /// Wrong number of operation arguments
    E3003,
    /// Unsupported assignment operator
    E3004,
    /// Allocation of unknown type
    E3005,
    /// Wrong allocation argument count
    E3006,
    /// Qualified array allocation
    E3007,
    /// Malformed allocation
    E3008,

    // Warnings (W3xxx)
    /// Macro call with wrong argument count, left unexpanded
    W3001,
    /// Macro operation not applicable, left unexpanded
    W3002,
    /// Macro call with unterminated argument list
    W3003,

    // Internal Errors (E9xxx)
    /// Internal compiler error
    E9001,
}

impl ErrorCode {
    /// Get the string representation of this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E1008 => "E1008",
            ErrorCode::E1009 => "E1009",
            ErrorCode::E1010 => "E1010",
            ErrorCode::E1011 => "E1011",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E3006 => "E3006",
            ErrorCode::E3007 => "E3007",
            ErrorCode::E3008 => "E3008",
            ErrorCode::W3001 => "W3001",
            ErrorCode::W3002 => "W3002",
            ErrorCode::W3003 => "W3003",
            ErrorCode::E9001 => "E9001",
        }
    }

    pub fn is_lexer_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E0001 | ErrorCode::E0002 | ErrorCode::E0003 | ErrorCode::E0004
        )
    }

    pub fn is_parser_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    pub fn is_type_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    pub fn is_expansion_error(&self) -> bool {
        self.as_str().starts_with("E3")
    }

    pub fn is_internal_error(&self) -> bool {
        matches!(self, ErrorCode::E9001)
    }

    /// Check if this code is a warning (never aborts compilation).
    pub fn is_warning(&self) -> bool {
        matches!(self, ErrorCode::W3001 | ErrorCode::W3002 | ErrorCode::W3003)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
