//! Documentation content for the kql CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Values,
    Operators,
    Nesting,
    Limits,
    Output,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" => Some(Self::Syntax),
            "values" | "value" | "escapes" => Some(Self::Values),
            "operators" | "ops" => Some(Self::Operators),
            "nesting" | "nested" => Some(Self::Nesting),
            "limits" | "limit" => Some(Self::Limits),
            "output" | "outputs" | "convert" => Some(Self::Output),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"KQL FILTER DOCUMENTATION

A filter is a list of clauses on named fields, combined with AND, OR and NOT.
Clauses written next to each other without an operator are joined by AND.

DOCUMENTATION CATEGORIES

  syntax            Clauses, boolean operators and grouping
  values            Quoting, escaping and wildcards
  operators         Equality, value lists and range comparisons
  nesting           Sub queries on nested objects with field:{...}
  limits            Depth and complexity limits, simple mode
  output            What the ast, filter and elastic commands print

QUICK REFERENCE

  field:value           Equality
  field:(a OR b)        Any of several values
  field>=10             Range comparison
  a:1 OR NOT b:2        Boolean operators
  (a:1 OR b:2) c:3      Grouping, implicit AND
  parent:{child:x}      Nested sub query

Run 'kql doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Values) => Ok(VALUES_DOC),
        Some(DocCategory::Operators) => Ok(OPERATORS_DOC),
        Some(DocCategory::Nesting) => Ok(NESTING_DOC),
        Some(DocCategory::Limits) => Ok(LIMITS_DOC),
        Some(DocCategory::Output) => Ok(OUTPUT_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX - Clauses and Boolean Operators

CLAUSES
  field:value
    Matches when the field equals the value.

    Example:
      Filter: status:active
      AST:    status=active

IMPLICIT AND
  a:1 b:2
    Clauses separated only by whitespace must all match.

    Example:
      Filter: a:1 b:2 c:3
      AST:    (a=1 AND b=2 AND c=3)

BOOLEAN OPERATORS
  AND, OR, NOT
    Keywords are case-insensitive. NOT binds tightest, then AND, then OR.

    Example:
      Filter: a:1 or b:2 and not c:3
      AST:    (a=1 OR (b=2 AND NOT c=3))

GROUPING
  ( ... )
    Parentheses override precedence.

    Example:
      Filter: (a:1 OR b:2) AND c:3
      AST:    ((a=1 OR b=2) AND c=3)

    Constraints:
      - Every '(' needs a matching ')'
      - Grouping counts towards the nesting depth limit
"#;

const VALUES_DOC: &str = r#"VALUES - Quoting, Escaping and Wildcards

BARE VALUES
  field:value
    Letters, digits, '_', '.' and most punctuation form a value.
    Adjacent tokens with no whitespace between them form one value.

    Example:
      Filter: discount:70%*
      AST:    discount=70%*

QUOTED VALUES
  field:"two words"
    Quotes keep whitespace, keywords and special characters literal.
    Inside quotes, '\x' stands for x.

    Example:
      Filter: title:"cats AND dogs"
      AST:    title=cats AND dogs

ESCAPES
  \\ \( \) \: \< \> \" \* \{ \} \and \or \not
    A backslash makes the next character, or keyword, part of the value.

    Example:
      Filter: field\(x\):separated\:value
      AST:    field(x)=separated:value

WILDCARDS
  field:prefix*
    '*' is kept as written. Consumers decide what it matches.

    Constraints:
      - A bare value with a wildcard needs a field, 'value*' alone is an error
"#;

const OPERATORS_DOC: &str = r#"OPERATORS - Equality, Value Lists and Ranges

EQUALITY
  field:value

VALUE LISTS
  field:(a OR b)
    Matches any of the listed values. AND and nested groups are allowed
    in the list, although most consumers only accept OR of plain values.

    Example:
      Filter: state:(open OR pending)
      AST:    state=(open OR pending)

RANGES
  field<value  field<=value  field>value  field>=value
    Compares the field with a single value. Whitespace around the
    operator is allowed.

    Example:
      Filter: price >= 10 price<20
      AST:    (price>=10 AND price<20)

    Constraints:
      - A range takes exactly one value, 'field>(a OR b)' is an error
"#;

const NESTING_DOC: &str = r#"NESTING - Sub Queries on Nested Objects

NESTED QUERIES
  parent:{child:value}
    Applies a sub query to the fields of a nested object.

    Example:
      Filter: player:{position:keeper OR number:1}
      AST:    player={(position=keeper OR number=1)}

    The elastic output flattens nested identifiers:
      player:{position:keeper}   =>   player.position
"#;

const LIMITS_DOC: &str = r#"LIMITS - Depth, Complexity and Simple Mode

NESTING DEPTH
  --max-depth N
    Maximum nesting of parentheses and braces, 20 by default. 0 disables
    the check.

COMPLEXITY
  --max-complexity N
    Maximum number of explicit AND/OR operators, 20 by default.

SIMPLE MODE
  --simple
    Only clauses joined by AND are accepted. OR, NOT, grouping and
    value lists are rejected. The filter command always parses this way.
"#;

const OUTPUT_DOC: &str = r#"OUTPUT - Commands

AST
  kql ast '<filter>'
    Prints the canonical form of the parsed filter.

    Example:
      kql ast 'a:1 OR b:2'
      => (a=1 OR b=2)

FILTER
  kql filter '<filter>' [--ranges]
    Prints the clauses of a simple filter as JSON.

    Example:
      kql filter 'a:1 b>2' --ranges
      => [{"field":"a","operator":"=","values":["1"]},
          {"field":"b","operator":">","values":["2"]}]

    Constraints:
      - Range clauses need --ranges
      - A field may appear in at most two clauses

ELASTIC
  kql elastic '<filter>' [--fields REGEX]
    Prints an Elasticsearch query. With --fields, every field must match
    the pattern.

    Example:
      kql elastic 'type:(a OR b)'
      => {"terms":{"type":["a","b"]}}

The filter is read from stdin when it is not given as an argument.
"#;
