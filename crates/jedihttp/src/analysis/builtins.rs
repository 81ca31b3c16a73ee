//! Python keywords, builtins and the members of the literal types.

pub const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

pub const BUILTIN_FUNCTIONS: &[&str] = &[
    "__import__", "abs", "aiter", "all", "anext", "any", "ascii", "bin", "breakpoint",
    "callable", "chr", "compile", "delattr", "dir", "divmod", "enumerate", "eval", "exec",
    "filter", "format", "getattr", "globals", "hasattr", "hash", "help", "hex", "id", "input",
    "isinstance", "issubclass", "iter", "len", "locals", "map", "max", "min", "next", "oct",
    "open", "ord", "pow", "print", "repr", "reversed", "round", "setattr", "sorted", "sum",
    "vars", "zip",
];

pub const BUILTIN_CLASSES: &[&str] = &[
    "bool", "bytearray", "bytes", "classmethod", "complex", "dict", "float", "frozenset",
    "int", "list", "memoryview", "object", "property", "range", "set", "slice",
    "staticmethod", "str", "super", "tuple", "type",
    "ArithmeticError", "AssertionError", "AttributeError", "BaseException",
    "BlockingIOError", "BrokenPipeError", "BufferError", "ConnectionError", "EOFError",
    "Exception", "FileExistsError", "FileNotFoundError", "FloatingPointError",
    "GeneratorExit", "ImportError", "IndentationError", "IndexError", "InterruptedError",
    "IsADirectoryError", "KeyError", "KeyboardInterrupt", "LookupError", "MemoryError",
    "ModuleNotFoundError", "NameError", "NotADirectoryError", "NotImplementedError",
    "OSError", "OverflowError", "PermissionError", "RecursionError", "ReferenceError",
    "RuntimeError", "StopAsyncIteration", "StopIteration", "SyntaxError", "SystemError",
    "SystemExit", "TabError", "TimeoutError", "TypeError", "UnboundLocalError",
    "UnicodeDecodeError", "UnicodeEncodeError", "UnicodeError", "ValueError",
    "ZeroDivisionError",
];

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Description of a builtin name, `None` if `name` is not a builtin.
pub fn builtin_description(name: &str) -> Option<String> {
    if BUILTIN_FUNCTIONS.contains(&name) {
        Some(format!("def {}", name))
    } else if BUILTIN_CLASSES.contains(&name) {
        Some(format!("class {}", name))
    } else {
        None
    }
}

/// Every builtin name, sorted.
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    let mut names: Vec<&'static str> = BUILTIN_FUNCTIONS
        .iter()
        .chain(BUILTIN_CLASSES)
        .copied()
        .collect();
    names.sort_unstable();
    names.into_iter()
}

/// Types whose members can be offered after a literal receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralType {
    Str,
    Bytes,
    Int,
    Float,
    List,
    Tuple,
    Dict,
    Set,
}

impl LiteralType {
    /// Type constructed by calling the builtin `name`.
    pub fn from_constructor(name: &str) -> Option<Self> {
        match name {
            "str" => Some(Self::Str),
            "bytes" => Some(Self::Bytes),
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "list" => Some(Self::List),
            "tuple" => Some(Self::Tuple),
            "dict" => Some(Self::Dict),
            "set" => Some(Self::Set),
            _ => None,
        }
    }

    pub fn members(self) -> &'static [&'static str] {
        match self {
            Self::Str => STR_MEMBERS,
            Self::Bytes => BYTES_MEMBERS,
            Self::Int => &[
                "as_integer_ratio", "bit_count", "bit_length", "conjugate", "denominator",
                "from_bytes", "imag", "numerator", "real", "to_bytes",
            ],
            Self::Float => &[
                "as_integer_ratio", "conjugate", "fromhex", "hex", "imag", "is_integer", "real",
            ],
            Self::List => &[
                "append", "clear", "copy", "count", "extend", "index", "insert", "pop", "remove",
                "reverse", "sort",
            ],
            Self::Tuple => &["count", "index"],
            Self::Dict => &[
                "clear", "copy", "fromkeys", "get", "items", "keys", "pop", "popitem",
                "setdefault", "update", "values",
            ],
            Self::Set => &[
                "add", "clear", "copy", "difference", "difference_update", "discard",
                "intersection", "intersection_update", "isdisjoint", "issubset", "issuperset",
                "pop", "remove", "symmetric_difference", "symmetric_difference_update", "union",
                "update",
            ],
        }
    }
}

const STR_MEMBERS: &[&str] = &[
    "capitalize", "casefold", "center", "count", "encode", "endswith", "expandtabs", "find",
    "format", "format_map", "index", "isalnum", "isalpha", "isascii", "isdecimal", "isdigit",
    "isidentifier", "islower", "isnumeric", "isprintable", "isspace", "istitle", "isupper",
    "join", "ljust", "lower", "lstrip", "maketrans", "partition", "removeprefix",
    "removesuffix", "replace", "rfind", "rindex", "rjust", "rpartition", "rsplit", "rstrip",
    "split", "splitlines", "startswith", "strip", "swapcase", "title", "translate", "upper",
    "zfill",
];

const BYTES_MEMBERS: &[&str] = &[
    "capitalize", "center", "count", "decode", "endswith", "expandtabs", "find", "fromhex",
    "hex", "index", "isalnum", "isalpha", "isascii", "isdigit", "islower", "isspace",
    "istitle", "isupper", "join", "ljust", "lower", "lstrip", "maketrans", "partition",
    "removeprefix", "removesuffix", "replace", "rfind", "rindex", "rjust", "rpartition",
    "rsplit", "rstrip", "split", "splitlines", "startswith", "strip", "swapcase", "title",
    "translate", "upper", "zfill",
];
