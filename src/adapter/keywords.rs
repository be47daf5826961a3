//! Per-language keyword and library-name tables.
//!
//! Everything the scanner needs to know about a language's vocabulary lives
//! here, so adding a language means adding one arm to [`keyword_table`].

use super::{StructureKind, StructureOp};
use crate::core::Language;

/// How a `for` header decides between a counted and an iteration loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForStyle {
    /// `for x in xs` is always an iteration loop.
    ForEach,
    /// `for (...)`: a `;` inside the parentheses makes it a counted loop.
    Parenthesized,
    /// Go: clauses with `;` are counted, `range` is iteration, a bare
    /// condition is a `while`.
    Clauses,
}

#[derive(Debug, Clone, Copy)]
pub struct KeywordTable {
    pub for_style: ForStyle,
    pub while_keywords: &'static [&'static str],
    /// Keyword opening a body whose condition trails it (`do`, `repeat`).
    pub do_keyword: Option<&'static str>,
    pub function_keywords: &'static [&'static str],
    pub branch_keywords: &'static [&'static str],
    pub reserved: &'static [&'static str],
    /// `name(params) {` declares a method (Java, C++, JS/TS classes).
    pub signature_methods: bool,
    /// `if (x) stmt;` and `for (...) stmt;` without braces.
    pub braceless_bodies: bool,
    pub arrow_functions: bool,
    /// `x = []` / `x = {}` allocate a collection.
    pub literal_collections: bool,
    /// `std::vector<int> v;` declares and constructs.
    pub declaration_constructs: bool,
    /// `x in y` is a membership test.
    pub in_operator: bool,
    pub structures: &'static [(&'static str, StructureKind)],
}

impl KeywordTable {
    pub fn is_reserved(&self, word: &str) -> bool {
        self.reserved.contains(&word)
            || self.function_keywords.contains(&word)
            || self.while_keywords.contains(&word)
            || self.branch_keywords.contains(&word)
            || word == "for"
            || self.do_keyword == Some(word)
    }

    pub fn structure(&self, name: &str) -> Option<StructureKind> {
        self.structures
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, kind)| *kind)
    }
}

const C_BRANCHES: &[&str] = &["if", "else", "switch"];

const PYTHON_STRUCTURES: &[(&str, StructureKind)] = &[
    ("dict", StructureKind::HashMap),
    ("defaultdict", StructureKind::HashMap),
    ("Counter", StructureKind::HashMap),
    ("OrderedDict", StructureKind::HashMap),
    ("set", StructureKind::Set),
    ("frozenset", StructureKind::Set),
    ("deque", StructureKind::Queue),
    ("list", StructureKind::Array),
    ("SortedList", StructureKind::Sorted),
    ("SortedDict", StructureKind::Sorted),
    ("heapify", StructureKind::Sorted),
];

const JAVA_STRUCTURES: &[(&str, StructureKind)] = &[
    ("HashMap", StructureKind::HashMap),
    ("LinkedHashMap", StructureKind::HashMap),
    ("Hashtable", StructureKind::HashMap),
    ("TreeMap", StructureKind::Sorted),
    ("TreeSet", StructureKind::Sorted),
    ("PriorityQueue", StructureKind::Sorted),
    ("HashSet", StructureKind::Set),
    ("LinkedHashSet", StructureKind::Set),
    ("ArrayList", StructureKind::Array),
    ("LinkedList", StructureKind::Queue),
    ("ArrayDeque", StructureKind::Queue),
    ("Stack", StructureKind::Stack),
];

const CPP_STRUCTURES: &[(&str, StructureKind)] = &[
    ("unordered_map", StructureKind::HashMap),
    ("unordered_set", StructureKind::Set),
    ("map", StructureKind::Sorted),
    ("set", StructureKind::Sorted),
    ("multiset", StructureKind::Sorted),
    ("priority_queue", StructureKind::Sorted),
    ("vector", StructureKind::Array),
    ("array", StructureKind::Array),
    ("stack", StructureKind::Stack),
    ("queue", StructureKind::Queue),
    ("deque", StructureKind::Queue),
];

const RUST_STRUCTURES: &[(&str, StructureKind)] = &[
    ("HashMap", StructureKind::HashMap),
    ("HashSet", StructureKind::Set),
    ("BTreeMap", StructureKind::Sorted),
    ("BTreeSet", StructureKind::Sorted),
    ("BinaryHeap", StructureKind::Sorted),
    ("Vec", StructureKind::Array),
    ("vec", StructureKind::Array),
    ("VecDeque", StructureKind::Queue),
];

const GO_STRUCTURES: &[(&str, StructureKind)] = &[("map", StructureKind::HashMap)];

const SWIFT_STRUCTURES: &[(&str, StructureKind)] = &[
    ("Dictionary", StructureKind::HashMap),
    ("Set", StructureKind::Set),
    ("Array", StructureKind::Array),
];

const JS_STRUCTURES: &[(&str, StructureKind)] = &[
    ("Map", StructureKind::HashMap),
    ("WeakMap", StructureKind::HashMap),
    ("Set", StructureKind::Set),
    ("WeakSet", StructureKind::Set),
    ("Array", StructureKind::Array),
];

pub fn keyword_table(language: Language) -> KeywordTable {
    let c_family = KeywordTable {
        for_style: ForStyle::Parenthesized,
        while_keywords: &["while"],
        do_keyword: Some("do"),
        function_keywords: &[],
        branch_keywords: C_BRANCHES,
        reserved: &[
            "return", "new", "case", "default", "break", "continue", "throw", "try", "catch",
            "sizeof", "typeof", "instanceof", "delete", "super", "this", "synchronized",
            "await", "async", "yield", "const", "let", "var", "public", "private", "static",
        ],
        signature_methods: true,
        braceless_bodies: true,
        arrow_functions: false,
        literal_collections: false,
        declaration_constructs: false,
        in_operator: false,
        structures: &[],
    };

    match language {
        Language::Python => KeywordTable {
            for_style: ForStyle::ForEach,
            do_keyword: None,
            function_keywords: &["def"],
            branch_keywords: &["if", "elif", "else", "match"],
            reserved: &[
                "return", "lambda", "yield", "not", "and", "or", "is", "in", "print", "range",
                "len", "class", "pass", "break", "continue", "with", "assert", "del",
            ],
            signature_methods: false,
            braceless_bodies: false,
            literal_collections: true,
            in_operator: true,
            structures: PYTHON_STRUCTURES,
            ..c_family
        },
        Language::JavaScript | Language::TypeScript => KeywordTable {
            function_keywords: &["function"],
            arrow_functions: true,
            literal_collections: true,
            in_operator: true,
            structures: JS_STRUCTURES,
            ..c_family
        },
        Language::Java => KeywordTable {
            structures: JAVA_STRUCTURES,
            ..c_family
        },
        Language::Cpp => KeywordTable {
            declaration_constructs: true,
            structures: CPP_STRUCTURES,
            ..c_family
        },
        Language::Rust => KeywordTable {
            for_style: ForStyle::ForEach,
            while_keywords: &["while", "loop"],
            do_keyword: None,
            function_keywords: &["fn"],
            branch_keywords: &["if", "else", "match"],
            reserved: &[
                "return", "let", "mut", "ref", "in", "as", "impl", "pub", "struct", "enum",
                "break", "continue", "Some", "Ok", "Err", "Box", "self", "Self",
            ],
            signature_methods: false,
            braceless_bodies: false,
            structures: RUST_STRUCTURES,
            ..c_family
        },
        Language::Go => KeywordTable {
            for_style: ForStyle::Clauses,
            while_keywords: &[],
            do_keyword: None,
            function_keywords: &["func"],
            reserved: &[
                "return", "range", "var", "go", "defer", "chan", "select", "case", "default",
                "break", "continue", "len", "append", "make",
            ],
            signature_methods: false,
            braceless_bodies: false,
            literal_collections: true,
            structures: GO_STRUCTURES,
            ..c_family
        },
        Language::Swift => KeywordTable {
            for_style: ForStyle::ForEach,
            do_keyword: Some("repeat"),
            function_keywords: &["func"],
            branch_keywords: &["if", "else", "switch", "guard"],
            reserved: &[
                "return", "let", "var", "in", "inout", "case", "default", "break", "continue",
                "self", "init",
            ],
            signature_methods: false,
            braceless_bodies: false,
            literal_collections: true,
            structures: SWIFT_STRUCTURES,
            ..c_family
        },
    }
}

/// Method names and the structure operation they imply. `None` for the kind
/// means the receiver decides.
pub const METHOD_OPS: &[(&str, Option<StructureKind>, StructureOp)] = &[
    ("get", None, StructureOp::Lookup),
    ("has", None, StructureOp::Lookup),
    ("containsKey", Some(StructureKind::HashMap), StructureOp::Lookup),
    ("contains_key", Some(StructureKind::HashMap), StructureOp::Lookup),
    ("getOrDefault", Some(StructureKind::HashMap), StructureOp::Lookup),
    ("put", Some(StructureKind::HashMap), StructureOp::Insert),
    ("set", Some(StructureKind::HashMap), StructureOp::Insert),
    ("setdefault", Some(StructureKind::HashMap), StructureOp::Insert),
    ("insert", None, StructureOp::Insert),
    ("emplace", None, StructureOp::Insert),
    ("add", Some(StructureKind::Set), StructureOp::Insert),
    ("append", Some(StructureKind::Array), StructureOp::Insert),
    ("push_back", Some(StructureKind::Array), StructureOp::Insert),
    ("push", Some(StructureKind::Stack), StructureOp::Insert),
    ("pop", Some(StructureKind::Stack), StructureOp::Remove),
    ("remove", None, StructureOp::Remove),
    ("erase", None, StructureOp::Remove),
    ("appendleft", Some(StructureKind::Queue), StructureOp::Insert),
    ("popleft", Some(StructureKind::Queue), StructureOp::Remove),
    ("offer", Some(StructureKind::Queue), StructureOp::Insert),
    ("poll", Some(StructureKind::Queue), StructureOp::Remove),
    ("shift", Some(StructureKind::Queue), StructureOp::Remove),
    ("unshift", Some(StructureKind::Queue), StructureOp::Insert),
    ("push_front", Some(StructureKind::Queue), StructureOp::Insert),
    ("pop_front", Some(StructureKind::Queue), StructureOp::Remove),
    ("heappush", Some(StructureKind::Sorted), StructureOp::Insert),
    ("heappop", Some(StructureKind::Sorted), StructureOp::Remove),
    ("indexOf", None, StructureOp::Search),
    ("lastIndexOf", None, StructureOp::Search),
    ("includes", None, StructureOp::Search),
    ("index", None, StructureOp::Search),
    ("firstIndex", None, StructureOp::Search),
    ("contains", None, StructureOp::Membership),
    ("count", None, StructureOp::Membership),
    ("find", None, StructureOp::Membership),
];

/// Free functions that are structure operations on their first argument.
pub const FREE_OPS: &[&str] = &["heappush", "heappop"];

pub const SORT_NAMES: &[&str] = &[
    "sort",
    "sorted",
    "sort_by",
    "sort_by_key",
    "sort_unstable",
    "sort_unstable_by",
    "stable_sort",
    "toSorted",
    "Sort",
    "Slice",
    "SliceStable",
    "Ints",
    "Strings",
];

/// Names that only sort when qualified by `sort.` (Go).
pub const QUALIFIED_SORT_NAMES: &[&str] = &["Slice", "SliceStable", "Ints", "Strings", "Sort"];

pub const MIN_MAX: &[&str] = &["max", "min"];

/// Iterator combinators that walk their receiver once per call.
pub const ITERATION_METHODS: &[&str] = &[
    "forEach",
    "for_each",
    "map",
    "filter",
    "reduce",
    "fold",
    "flatMap",
    "flat_map",
    "some",
    "every",
    "any",
    "all",
    "sum",
    "filter_map",
];

pub const MEMO_DECORATORS: &[&str] = &["lru_cache", "cache", "memoize", "memoized", "cached"];

/// Identifiers conventionally used for memo/DP tables.
pub fn is_memo_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.starts_with("memo")
        || matches!(lower.as_str(), "cache" | "dp" | "table" | "lookup")
}

/// Helper names whose presence marks a recursive function as divide-and-conquer.
pub const DIVIDE_HELPERS: &[&str] = &["merge", "partition"];
