//! # snapcode Derive Macros
//!
//! Provides `#[derive(Reflect)]`, which implements `snapcode::Reflect` by emitting a static
//! field table: one `FieldDescriptor` per field, carrying its name, declared type and accessors.
//!
//! Supported attributes on fields:
//!
//! * `#[snapshot(skip)]`: the field is not captured and keeps its default on restore.
//! * `#[snapshot(rename = "name")]`: the field is matched under another name, which keeps old
//!   snapshots restorable after a field was renamed.
//!
//! Compatible with `syn 2.0`.

use proc_macro::TokenStream;
use quote::quote;
use std::collections::HashSet;
use syn::{Attribute, Data, DeriveInput, GenericParam, LitStr, parse_macro_input, parse_quote};

/// Derives `snapcode::Reflect`.
#[proc_macro_derive(Reflect, attributes(snapshot))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(mut input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = input.ident.clone();

    let data_struct = match &input.data {
        Data::Struct(ds) => ds,
        _ => return Err(syn::Error::new(name.span(), "Reflect only supports structs")),
    };

    let mut fields = Vec::new();
    let mut labels = HashSet::new();
    for (position, field) in data_struct.fields.iter().enumerate() {
        let attrs = parse_attributes(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let (member, default_label) = match &field.ident {
            Some(ident) => (quote! { #ident }, ident.to_string()),
            None => {
                let index = syn::Index::from(position);
                (quote! { #index }, position.to_string())
            }
        };
        let label = attrs.rename.unwrap_or(default_label);
        // Restore matches fields by label.
        if !labels.insert(label.clone()) {
            return Err(syn::Error::new_spanned(
                field,
                format!("duplicate snapshot field name '{label}'"),
            ));
        }
        fields.push(ReflectedField {
            member,
            label,
            ty: field.ty.clone(),
        });
    }

    // Field accessors are erased behind `dyn Any`, so every type parameter must be 'static.
    for param in input.generics.params.iter_mut() {
        if let GenericParam::Type(ty) = param {
            ty.bounds.push(parse_quote!('static));
        }
    }

    let descriptors = fields.iter().map(|f| {
        let member = &f.member;
        let label = &f.label;
        let ty = &f.ty;
        quote! {
            snapcode::FieldDescriptor::new::<Self, #ty>(
                #label,
                |owner| &owner.#member,
                |owner| &mut owner.#member,
            )
        }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics snapcode::Reflect for #name #ty_generics #where_clause {
            fn fields() -> ::std::vec::Vec<snapcode::FieldDescriptor> {
                ::std::vec![ #(#descriptors),* ]
            }
        }
    })
}

struct ReflectedField {
    member: proc_macro2::TokenStream,
    label: String,
    ty: syn::Type,
}

#[derive(Default)]
struct FieldAttrs {
    skip: bool,
    rename: Option<String>,
}

/// Parses `#[snapshot(...)]` attributes.
fn parse_attributes(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut parsed = FieldAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("snapshot") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    parsed.skip = true;
                    return Ok(());
                }

                if meta.path.is_ident("rename") {
                    let value = meta.value()?;
                    let s: LitStr = value.parse()?;
                    parsed.rename = Some(s.value());
                    return Ok(());
                }
                Err(meta.error("Unknown snapshot attribute key. Supported: skip, rename"))
            })?;
        }
    }
    Ok(parsed)
}
