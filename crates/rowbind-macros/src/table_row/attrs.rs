//! Attribute parsing for the TableRow derive macro.
//!
//! Parsers for the `#[table(...)]` container attribute and the `#[cell(...)]`,
//! `#[insert(...)]` and `#[filter(...)]` field attributes.

use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Expr, ExprLit, Lit, LitStr, Meta, MetaNameValue, Result, Token,
};

/// A named, independently-rowed section: `section(name = "...", rows = "...")`.
#[derive(Debug, Clone)]
pub struct SectionAttr {
    pub name: String,
    pub rows: String,
}

/// Container-level attributes from `#[table(...)]`.
///
/// Several `#[table]` attributes on one struct are merged.
#[derive(Debug, Clone, Default)]
pub struct TableAttr {
    pub container: Option<String>,
    pub rows: Option<String>,
    pub header_row: Option<String>,
    pub sections: Vec<SectionAttr>,
}

impl TableAttr {
    fn merge(&mut self, other: TableAttr) {
        self.container = other.container.or(self.container.take());
        self.rows = other.rows.or(self.rows.take());
        self.header_row = other.header_row.or(self.header_row.take());
        self.sections.extend(other.sections);
    }
}

impl Parse for TableAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = TableAttr::default();
        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::NameValue(nv) if nv.path.is_ident("container") => {
                    attr.container = Some(string_value(nv)?);
                }
                Meta::NameValue(nv) if nv.path.is_ident("rows") => {
                    attr.rows = Some(string_value(nv)?);
                }
                Meta::NameValue(nv) if nv.path.is_ident("header_row") => {
                    attr.header_row = Some(string_value(nv)?);
                }
                Meta::List(list) if list.path.is_ident("section") => {
                    let inner = list.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
                    let mut name = None;
                    let mut rows = None;
                    for meta in inner {
                        match &meta {
                            Meta::NameValue(nv) if nv.path.is_ident("name") => {
                                name = Some(string_value(nv)?)
                            }
                            Meta::NameValue(nv) if nv.path.is_ident("rows") => {
                                rows = Some(string_value(nv)?)
                            }
                            _ => {
                                return Err(Error::new(
                                    meta.span(),
                                    "unknown section attribute. Expected: name = \"...\" or rows = \"...\"",
                                ))
                            }
                        }
                    }
                    match (name, rows) {
                        (Some(name), Some(rows)) => attr.sections.push(SectionAttr { name, rows }),
                        _ => {
                            return Err(Error::new(
                                list.span(),
                                "section requires both name = \"...\" and rows = \"...\"",
                            ))
                        }
                    }
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown table attribute. Expected: container, rows, header_row or section(...)",
                    ))
                }
            }
        }

        Ok(attr)
    }
}

/// Field-level attributes from `#[cell(...)]`.
#[derive(Debug, Clone, Default)]
pub struct CellAttr {
    pub locator: Option<String>,
    pub text: Option<String>,
    pub header: Option<String>,
    pub section: Option<String>,
    pub direct_text: bool,
}

impl Parse for CellAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = CellAttr::default();
        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("direct_text") => attr.direct_text = true,
                Meta::NameValue(nv) if nv.path.is_ident("locator") => {
                    attr.locator = Some(string_value(nv)?)
                }
                Meta::NameValue(nv) if nv.path.is_ident("text") => {
                    attr.text = Some(string_value(nv)?)
                }
                Meta::NameValue(nv) if nv.path.is_ident("header") => {
                    attr.header = Some(string_value(nv)?)
                }
                Meta::NameValue(nv) if nv.path.is_ident("section") => {
                    attr.section = Some(string_value(nv)?)
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown cell attribute. Expected: locator, text, header, section or direct_text",
                    ))
                }
            }
        }

        Ok(attr)
    }
}

/// Where an `#[insert]` or `#[filter]` request is routed.
#[derive(Debug, Clone)]
pub enum RouteTarget {
    /// `component = "kind", key = "..."`; the key defaults to the kind.
    Component { kind: String, key: String },
    /// `custom = path::to::function`
    Custom(Box<Expr>),
}

/// Field-level route from `#[insert(...)]` or `#[filter(...)]`.
#[derive(Debug, Clone)]
pub struct RouteAttr {
    pub target: RouteTarget,
    pub order: i32,
}

impl Parse for RouteAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let span = input.span();
        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        let mut component: Option<LitStr> = None;
        let mut key = None;
        let mut custom = None;
        let mut order = 0;

        for meta in content {
            match &meta {
                Meta::NameValue(nv) if nv.path.is_ident("component") => {
                    component = Some(string_lit(nv)?)
                }
                Meta::NameValue(nv) if nv.path.is_ident("key") => key = Some(string_value(nv)?),
                Meta::NameValue(nv) if nv.path.is_ident("custom") => {
                    custom = Some(nv.value.clone())
                }
                Meta::NameValue(nv) if nv.path.is_ident("order") => {
                    order = match &nv.value {
                        Expr::Lit(ExprLit {
                            lit: Lit::Int(i), ..
                        }) => i.base10_parse::<i32>()?,
                        Expr::Unary(syn::ExprUnary {
                            op: syn::UnOp::Neg(_),
                            expr,
                            ..
                        }) => match expr.as_ref() {
                            Expr::Lit(ExprLit {
                                lit: Lit::Int(i), ..
                            }) => -i.base10_parse::<i32>()?,
                            other => {
                                return Err(Error::new(other.span(), "order must be an integer"))
                            }
                        },
                        other => return Err(Error::new(other.span(), "order must be an integer")),
                    }
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown route attribute. Expected: component, key, custom or order",
                    ))
                }
            }
        }

        let target = match (component, custom) {
            (Some(_), Some(custom)) => {
                return Err(Error::new(
                    custom.span(),
                    "a field may declare either component or custom, not both",
                ))
            }
            (Some(kind), None) => {
                let kind = kind.value();
                RouteTarget::Component {
                    key: key.unwrap_or_else(|| kind.clone()),
                    kind,
                }
            }
            (None, Some(custom)) => {
                if key.is_some() {
                    return Err(Error::new(span, "key is only valid with component"));
                }
                RouteTarget::Custom(Box::new(custom))
            }
            (None, None) => {
                return Err(Error::new(
                    span,
                    "expected component = \"...\" or custom = path::to::function",
                ))
            }
        };

        Ok(RouteAttr { target, order })
    }
}

/// All rowbind attributes of one field.
#[derive(Debug, Clone, Default)]
pub struct FieldAttrs {
    pub cell: Option<CellAttr>,
    pub insert: Option<RouteAttr>,
    pub filter: Option<RouteAttr>,
}

/// Collects and merges `#[table(...)]` attributes of the struct.
pub fn parse_table_attrs(attrs: &[Attribute]) -> Result<TableAttr> {
    let mut table = TableAttr::default();
    for attr in attrs {
        if attr.path().is_ident("table") {
            table.merge(attr.parse_args::<TableAttr>()?);
        }
    }
    Ok(table)
}

/// Extracts the `#[cell]`, `#[insert]` and `#[filter]` attributes of a field.
pub fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttrs> {
    let mut parsed = FieldAttrs::default();
    for attr in attrs {
        let path = attr.path();
        if path.is_ident("cell") {
            if parsed.cell.is_some() {
                return Err(Error::new(attr.span(), "duplicate #[cell] attribute"));
            }
            parsed.cell = Some(match &attr.meta {
                Meta::Path(_) => CellAttr::default(),
                _ => attr.parse_args::<CellAttr>()?,
            });
        } else if path.is_ident("insert") {
            if parsed.insert.is_some() {
                return Err(Error::new(attr.span(), "duplicate #[insert] attribute"));
            }
            parsed.insert = Some(attr.parse_args::<RouteAttr>()?);
        } else if path.is_ident("filter") {
            if parsed.filter.is_some() {
                return Err(Error::new(attr.span(), "duplicate #[filter] attribute"));
            }
            parsed.filter = Some(attr.parse_args::<RouteAttr>()?);
        }
    }
    Ok(parsed)
}

fn string_lit(nv: &MetaNameValue) -> Result<LitStr> {
    match &nv.value {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.clone()),
        other => Err(Error::new(
            other.span(),
            format!(
                "{} must be a string literal",
                nv.path
                    .get_ident()
                    .map(|i| i.to_string())
                    .unwrap_or_default()
            ),
        )),
    }
}

fn string_value(nv: &MetaNameValue) -> Result<String> {
    string_lit(nv).map(|s| s.value())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_table(tokens: &str) -> Result<TableAttr> {
        syn::parse_str::<TableAttr>(tokens)
    }

    fn parse_cell(tokens: &str) -> Result<CellAttr> {
        syn::parse_str::<CellAttr>(tokens)
    }

    fn parse_route(tokens: &str) -> Result<RouteAttr> {
        syn::parse_str::<RouteAttr>(tokens)
    }

    #[test]
    fn test_table_locators() {
        let attr =
            parse_table(r#"container = "id=users", rows = "tbody tr", header_row = "thead tr""#)
                .unwrap();
        assert_eq!(attr.container.as_deref(), Some("id=users"));
        assert_eq!(attr.rows.as_deref(), Some("tbody tr"));
        assert_eq!(attr.header_row.as_deref(), Some("thead tr"));
        assert!(attr.sections.is_empty());
    }

    #[test]
    fn test_table_section() {
        let attr = parse_table(r#"section(name = "totals", rows = "tfoot tr")"#).unwrap();
        assert_eq!(attr.sections.len(), 1);
        assert_eq!(attr.sections[0].name, "totals");
        assert_eq!(attr.sections[0].rows, "tfoot tr");
    }

    #[test]
    fn test_table_section_requires_rows() {
        let err = parse_table(r#"section(name = "totals")"#).unwrap_err();
        assert!(err.to_string().contains("section requires both"));
    }

    #[test]
    fn test_table_merge_keeps_later_values() {
        let mut first = parse_table(r#"container = "id=a", rows = "tr""#).unwrap();
        first.merge(parse_table(r#"container = "id=b", section(name = "s", rows = "li")"#).unwrap());
        assert_eq!(first.container.as_deref(), Some("id=b"));
        assert_eq!(first.rows.as_deref(), Some("tr"));
        assert_eq!(first.sections.len(), 1);
    }

    #[test]
    fn test_cell_all_keys() {
        let attr = parse_cell(
            r#"locator = "td.name", text = "span", header = "th.name", section = "s1", direct_text"#,
        )
        .unwrap();
        assert_eq!(attr.locator.as_deref(), Some("td.name"));
        assert_eq!(attr.text.as_deref(), Some("span"));
        assert_eq!(attr.header.as_deref(), Some("th.name"));
        assert_eq!(attr.section.as_deref(), Some("s1"));
        assert!(attr.direct_text);
    }

    #[test]
    fn test_cell_unknown_key() {
        let err = parse_cell(r#"selector = "td""#).unwrap_err();
        assert!(err.to_string().contains("unknown cell attribute"));
    }

    #[test]
    fn test_cell_locator_must_be_string() {
        let err = parse_cell("locator = 3").unwrap_err();
        assert!(err.to_string().contains("locator must be a string literal"));
    }

    #[test]
    fn test_route_component() {
        let attr = parse_route(r#"component = "input", key = "md-input", order = 2"#).unwrap();
        assert_eq!(attr.order, 2);
        match attr.target {
            RouteTarget::Component { kind, key } => {
                assert_eq!(kind, "input");
                assert_eq!(key, "md-input");
            }
            RouteTarget::Custom(_) => panic!("expected component route"),
        }
    }

    #[test]
    fn test_route_key_defaults_to_kind() {
        let attr = parse_route(r#"component = "select""#).unwrap();
        assert_eq!(attr.order, 0);
        assert!(matches!(
            attr.target,
            RouteTarget::Component { ref kind, ref key } if kind == "select" && key == "select"
        ));
    }

    #[test]
    fn test_route_custom_negative_order() {
        let attr = parse_route("custom = helpers::fill_date, order = -1").unwrap();
        assert_eq!(attr.order, -1);
        assert!(matches!(attr.target, RouteTarget::Custom(_)));
    }

    #[test]
    fn test_route_rejects_both_targets() {
        let err = parse_route(r#"component = "input", custom = fill"#).unwrap_err();
        assert!(err.to_string().contains("either component or custom"));
    }

    #[test]
    fn test_route_requires_target() {
        let err = parse_route("order = 1").unwrap_err();
        assert!(err.to_string().contains("expected component"));
    }
}
