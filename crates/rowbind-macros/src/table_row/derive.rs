//! Implementation of the `#[derive(TableRow)]` macro.
//!
//! Generates one `TableField` constant per bound field and the
//! `TableRow::table_schema` registration function.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{ext::IdentExt, spanned::Spanned, Data, DeriveInput, Error, Fields, Result};

use super::attrs::{parse_field_attrs, parse_table_attrs, RouteAttr, RouteTarget};

/// Main implementation of the TableRow derive macro.
pub fn table_row_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "TableRow can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "TableRow can only be derived for structs",
            ))
        }
    };

    let table = parse_table_attrs(&input.attrs)?;
    let require = |value: Option<String>, key: &str| {
        value.ok_or_else(|| {
            Error::new(
                input.ident.span(),
                format!("missing #[table({} = \"...\")] attribute", key),
            )
        })
    };
    let container = require(table.container, "container")?;
    let rows = require(table.rows, "rows")?;
    let header_row = require(table.header_row, "header_row")?;
    let sections = table.sections.iter().map(|s| {
        let name = &s.name;
        let rows = &s.rows;
        quote! { .section(#name, ::rowbind::Locator::parse(#rows)) }
    });

    let mut field_constants: Vec<TokenStream> = Vec::new();
    let mut bindings: Vec<TokenStream> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_field_attrs(&field.attrs)?;
        let Some(cell) = attrs.cell else {
            if attrs.insert.is_some() || attrs.filter.is_some() {
                return Err(Error::new(
                    field.span(),
                    "#[insert] and #[filter] require a #[cell] attribute on the same field",
                ));
            }
            continue;
        };

        let name = field_name.unraw().to_string();
        let const_name = format_ident!("{}", to_screaming_snake_case(&name));

        field_constants.push(quote! {
            pub const #const_name: ::rowbind::TableField<Self> =
                ::rowbind::TableField::new(#name, |row, field, value| {
                    ::rowbind::CellSlot::write_slot(&mut row.#field_name, field, value)
                });
        });

        let locator = cell
            .locator
            .map(|l| quote! { .cell(::rowbind::Locator::parse(#l)) });
        let text = cell
            .text
            .map(|l| quote! { .cell_text(::rowbind::Locator::parse(#l)) });
        let header = cell
            .header
            .map(|l| quote! { .header_cell(::rowbind::Locator::parse(#l)) });
        let section = cell.section.map(|s| quote! { .section(#s) });
        let direct_text = cell.direct_text.then(|| quote! { .direct_text() });
        let insertion = attrs.insert.map(|route| {
            let route = route_tokens(&route, quote! { ::rowbind::InsertionRoute });
            quote! { .insertion(#route) }
        });
        let filter = attrs.filter.map(|route| {
            let route = route_tokens(&route, quote! { ::rowbind::FilterRoute });
            quote! { .filter(#route) }
        });

        bindings.push(quote! {
            .field(
                ::rowbind::FieldBinding::new(Self::#const_name, |row: &Self| &row.#field_name)
                    #locator
                    #text
                    #header
                    #section
                    #direct_text
                    #insertion
                    #filter
            )
        });
    }

    let expanded = quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#field_constants)*
        }

        impl #impl_generics ::rowbind::TableRow for #struct_name #ty_generics #where_clause {
            fn table_schema() -> ::rowbind::Result<::rowbind::TableSchema<Self>> {
                let table = ::rowbind::TableDescriptor::new(
                    ::rowbind::Locator::parse(#container),
                    ::rowbind::Locator::parse(#rows),
                    ::rowbind::Locator::parse(#header_row),
                )
                #(#sections)*;
                ::rowbind::TableSchema::builder(table)
                    #(#bindings)*
                    .build()
            }
        }
    };

    Ok(expanded)
}

fn route_tokens(route: &RouteAttr, ty: TokenStream) -> TokenStream {
    let order = route.order;
    match &route.target {
        RouteTarget::Component { kind, key } => quote! { #ty::component(#kind, #key, #order) },
        RouteTarget::Custom(function) => quote! { #ty::custom(#function, #order) },
    }
}

/// Convert a string to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = true;
        }
    }

    result
}
