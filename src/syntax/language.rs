use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// `// line` and `/* block */`
    Slash,
    /// `# line`
    Hash,
    /// `<!-- markup -->`
    Markup,
    /// `-- line`
    Sql,
}

/// Static description of how to highlight one language.
#[derive(Debug)]
pub struct LanguageConfig {
    pub name: &'static str,
    pub comment_styles: &'static [CommentStyle],
    pub keywords: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    TypeScript,
    JavaScript,
    Json,
    Jsonc,
    Css,
    Html,
    Xml,
    Sql,
    Markdown,
    Yaml,
    Toml,
    Python,
    Ruby,
    Shell,
    Go,
    Rust,
    C,
    Cpp,
    Java,
    Php,
    Swift,
    Kotlin,
}

const C_STYLE_KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "do", "switch", "case", "default", "break", "continue",
    "return", "function", "class", "extends", "implements", "interface", "type", "enum",
    "const", "let", "var", "static", "public", "private", "protected", "readonly", "new",
    "this", "super", "try", "catch", "finally", "throw", "async", "await", "import", "export",
    "from", "as", "typeof", "instanceof", "in", "of", "void", "null", "undefined", "true",
    "false", "get", "set", "yield",
];

const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var", "true", "false", "nil",
];

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "False", "finally", "for", "from", "global", "if", "import", "in", "is",
    "lambda", "None", "nonlocal", "not", "or", "pass", "raise", "return", "True", "try",
    "while", "with", "yield",
];

const RUBY_KEYWORDS: &[&str] = &[
    "alias", "and", "begin", "break", "case", "class", "def", "defined?", "do", "else", "elsif",
    "end", "ensure", "false", "for", "if", "in", "module", "next", "nil", "not", "or", "redo",
    "rescue", "retry", "return", "self", "super", "then", "true", "undef", "unless", "until",
    "when", "while", "yield",
];

const SHELL_KEYWORDS: &[&str] = &[
    "if", "then", "else", "elif", "fi", "for", "do", "done", "while", "until", "case", "esac",
    "function", "in", "select", "return", "exit", "break", "continue", "local", "export",
    "readonly", "declare", "typeset", "unset", "shift", "source", "true", "false",
];

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface",
    "long", "native", "new", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "try", "void", "volatile", "while", "true", "false", "null",
];

// Matched case-insensitively.
const SQL_KEYWORDS: &[&str] = &[
    "SELECT", "FROM", "WHERE", "AND", "OR", "NOT", "IN", "IS", "NULL", "TRUE", "FALSE",
    "INSERT", "INTO", "VALUES", "UPDATE", "SET", "DELETE", "CREATE", "DROP", "ALTER", "TABLE",
    "INDEX", "VIEW", "DATABASE", "SCHEMA", "CONSTRAINT", "PRIMARY", "KEY", "FOREIGN",
    "REFERENCES", "UNIQUE", "CHECK", "DEFAULT", "AUTO_INCREMENT", "JOIN", "INNER", "LEFT",
    "RIGHT", "OUTER", "FULL", "CROSS", "ON", "USING", "GROUP", "BY", "HAVING", "ORDER", "ASC",
    "DESC", "LIMIT", "OFFSET", "FETCH", "UNION", "INTERSECT", "EXCEPT", "ALL", "DISTINCT", "AS",
    "CASE", "WHEN", "THEN", "ELSE", "END", "IF", "EXISTS", "BETWEEN", "LIKE", "ILIKE",
    "SIMILAR", "TO", "CAST", "CONVERT", "COALESCE", "NULLIF", "COUNT", "SUM", "AVG", "MIN",
    "MAX", "BEGIN", "COMMIT", "ROLLBACK", "TRANSACTION", "SAVEPOINT", "GRANT", "REVOKE", "WITH",
    "RECURSIVE", "RETURNING", "OVER", "PARTITION", "ROW", "ROWS", "RANGE", "INT", "INTEGER",
    "BIGINT", "SMALLINT", "DECIMAL", "NUMERIC", "FLOAT", "REAL", "DOUBLE", "PRECISION",
    "VARCHAR", "CHAR", "TEXT", "BOOLEAN", "DATE", "TIME", "TIMESTAMP", "INTERVAL", "SERIAL",
    "BIGSERIAL", "UUID", "JSON", "JSONB", "ARRAY",
];

const SLASH: &[CommentStyle] = &[CommentStyle::Slash];
const HASH: &[CommentStyle] = &[CommentStyle::Hash];
const MARKUP: &[CommentStyle] = &[CommentStyle::Markup];
const NONE: &[CommentStyle] = &[];

const fn config(
    name: &'static str,
    comment_styles: &'static [CommentStyle],
    keywords: &'static [&'static str],
) -> LanguageConfig {
    LanguageConfig {
        name,
        comment_styles,
        keywords,
    }
}

static TYPESCRIPT: LanguageConfig = config("TypeScript", SLASH, C_STYLE_KEYWORDS);
static JAVASCRIPT: LanguageConfig = config("JavaScript", SLASH, C_STYLE_KEYWORDS);
static JSON: LanguageConfig = config("JSON", NONE, &[]);
static JSONC: LanguageConfig = config("JSON with Comments", SLASH, &[]);
static CSS: LanguageConfig = config("CSS", SLASH, &[]);
static HTML: LanguageConfig = config("HTML", MARKUP, &[]);
static XML: LanguageConfig = config("XML", MARKUP, &[]);
static SQL: LanguageConfig = config("SQL", &[CommentStyle::Sql, CommentStyle::Slash], SQL_KEYWORDS);
static MARKDOWN: LanguageConfig = config("Markdown", NONE, &[]);
static YAML: LanguageConfig = config(
    "YAML",
    HASH,
    &["true", "false", "null", "yes", "no", "on", "off"],
);
static TOML: LanguageConfig = config("TOML", HASH, &["true", "false"]);
static PYTHON: LanguageConfig = config("Python", HASH, PYTHON_KEYWORDS);
static RUBY: LanguageConfig = config("Ruby", HASH, RUBY_KEYWORDS);
static SHELL: LanguageConfig = config("Shell", HASH, SHELL_KEYWORDS);
static GO: LanguageConfig = config("Go", SLASH, GO_KEYWORDS);
static RUST: LanguageConfig = config("Rust", SLASH, RUST_KEYWORDS);
static C: LanguageConfig = config("C", SLASH, C_STYLE_KEYWORDS);
static CPP: LanguageConfig = config("C++", SLASH, C_STYLE_KEYWORDS);
static JAVA: LanguageConfig = config("Java", SLASH, JAVA_KEYWORDS);
static PHP: LanguageConfig = config(
    "PHP",
    &[CommentStyle::Slash, CommentStyle::Hash],
    C_STYLE_KEYWORDS,
);
static SWIFT: LanguageConfig = config("Swift", SLASH, C_STYLE_KEYWORDS);
static KOTLIN: LanguageConfig = config("Kotlin", SLASH, C_STYLE_KEYWORDS);

impl Language {
    pub const ALL: [Language; 22] = [
        Language::TypeScript,
        Language::JavaScript,
        Language::Json,
        Language::Jsonc,
        Language::Css,
        Language::Html,
        Language::Xml,
        Language::Sql,
        Language::Markdown,
        Language::Yaml,
        Language::Toml,
        Language::Python,
        Language::Ruby,
        Language::Shell,
        Language::Go,
        Language::Rust,
        Language::C,
        Language::Cpp,
        Language::Java,
        Language::Php,
        Language::Swift,
        Language::Kotlin,
    ];

    pub fn config(self) -> &'static LanguageConfig {
        match self {
            Language::TypeScript => &TYPESCRIPT,
            Language::JavaScript => &JAVASCRIPT,
            Language::Json => &JSON,
            Language::Jsonc => &JSONC,
            Language::Css => &CSS,
            Language::Html => &HTML,
            Language::Xml => &XML,
            Language::Sql => &SQL,
            Language::Markdown => &MARKDOWN,
            Language::Yaml => &YAML,
            Language::Toml => &TOML,
            Language::Python => &PYTHON,
            Language::Ruby => &RUBY,
            Language::Shell => &SHELL,
            Language::Go => &GO,
            Language::Rust => &RUST,
            Language::C => &C,
            Language::Cpp => &CPP,
            Language::Java => &JAVA,
            Language::Php => &PHP,
            Language::Swift => &SWIFT,
            Language::Kotlin => &KOTLIN,
        }
    }

    pub fn name(self) -> &'static str {
        self.config().name
    }

    pub fn is_markup(self) -> bool {
        matches!(self, Language::Html | Language::Xml)
    }

    pub fn keywords_ignore_case(self) -> bool {
        self == Language::Sql
    }

    pub fn has_triple_quoted_strings(self) -> bool {
        self == Language::Python
    }

    /// Map a file extension (any case) to a language.
    pub fn from_extension(ext: &str) -> Option<Language> {
        let language = match ext.to_ascii_lowercase().as_str() {
            "ts" | "tsx" | "mts" | "cts" => Language::TypeScript,
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "json" => Language::Json,
            "jsonc" => Language::Jsonc,
            "css" | "scss" | "sass" | "less" => Language::Css,
            "html" | "htm" => Language::Html,
            "xml" | "xsl" | "xslt" | "xsd" | "svg" | "plist" | "xaml" | "csproj" | "fsproj"
            | "vbproj" | "vcxproj" | "props" | "targets" | "nuspec" | "resx" | "pom" => {
                Language::Xml
            }
            "sql" => Language::Sql,
            "md" | "mdx" => Language::Markdown,
            "yaml" | "yml" => Language::Yaml,
            "toml" => Language::Toml,
            "py" | "pyw" => Language::Python,
            "rb" => Language::Ruby,
            "sh" | "bash" | "zsh" => Language::Shell,
            "go" => Language::Go,
            "rs" => Language::Rust,
            "c" | "h" => Language::C,
            "cpp" | "hpp" | "cc" | "cxx" => Language::Cpp,
            "java" => Language::Java,
            "php" => Language::Php,
            "swift" => Language::Swift,
            "kt" | "kts" => Language::Kotlin,
            _ => return None,
        };
        Some(language)
    }

    pub fn from_path(path: &str) -> Option<Language> {
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Language::from_extension)
    }
}
