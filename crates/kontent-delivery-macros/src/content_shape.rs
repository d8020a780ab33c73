//! Implementation of #[derive(ContentShape)]

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Field, Fields, GenericArgument, LitStr,
    PathArguments, Type,
};

/// Element value types assigned straight from an element.
const SCALARS: &[&str] = &[
    "String",
    "Decimal",
    "f64",
    "DateTime",
    "RichTextElement",
    "Element",
];

/// Vec element types that are element values rather than linked items.
const VALUE_LISTS: &[&str] = &["String", "Asset", "Taxonomy", "MultipleChoiceOption"];

pub fn derive_content_shape_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "ContentShape cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "ContentShape requires a struct with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "ContentShape only works on structs",
            ))
        }
    };

    let content_type = match parse_struct_attrs(&input.attrs)? {
        Some(tag) => quote! { ::std::option::Option::Some(#tag) },
        None => quote! { ::std::option::Option::None },
    };

    let mut bindings = Vec::new();
    for field in fields {
        let attrs = parse_field_attrs(field)?;
        if attrs.skip {
            continue;
        }
        bindings.push(field_binding(name, field, &attrs)?);
    }

    Ok(quote! {
        impl ::kontent_delivery::projection::ContentShape for #name {
            fn content_type() -> ::std::option::Option<&'static str> {
                #content_type
            }

            fn bindings() -> &'static [::kontent_delivery::projection::FieldBinding<Self>] {
                static BINDINGS: ::std::sync::LazyLock<
                    ::std::vec::Vec<::kontent_delivery::projection::FieldBinding<#name>>,
                > = ::std::sync::LazyLock::new(|| ::std::vec![#(#bindings),*]);
                &BINDINGS
            }
        }
    })
}

// ============================================================================
// ATTRIBUTES
// ============================================================================

/// `#[kontent(content_type = "...")]`
fn parse_struct_attrs(attrs: &[Attribute]) -> syn::Result<Option<LitStr>> {
    let mut content_type = None;
    for attr in attrs {
        if attr.path().is_ident("kontent") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("content_type") {
                    content_type = Some(meta.value()?.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("expected `content_type = \"...\"`"))
                }
            })?;
        }
    }
    Ok(content_type)
}

#[derive(Default)]
struct FieldAttrs {
    element: Option<LitStr>,
    linked_item: Option<LitStr>,
    read_only: bool,
    skip: bool,
    force_value: bool,
    force_shape: bool,
}

/// `#[kontent(element = "..", linked_item = "..", read_only, skip, value, shape)]`
fn parse_field_attrs(field: &Field) -> syn::Result<FieldAttrs> {
    let mut parsed = FieldAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("kontent") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("element") {
                parsed.element = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("linked_item") {
                parsed.linked_item = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("read_only") {
                parsed.read_only = true;
            } else if meta.path.is_ident("skip") {
                parsed.skip = true;
            } else if meta.path.is_ident("value") {
                parsed.force_value = true;
            } else if meta.path.is_ident("shape") {
                parsed.force_shape = true;
            } else {
                return Err(meta.error(
                    "expected one of `element`, `linked_item`, `read_only`, `skip`, `value`, `shape`",
                ));
            }
            Ok(())
        })?;
    }
    if parsed.force_value && parsed.force_shape {
        return Err(syn::Error::new_spanned(
            &field.ident,
            "`value` and `shape` are mutually exclusive",
        ));
    }
    Ok(parsed)
}

// ============================================================================
// SLOT INFERENCE
// ============================================================================

/// Last path segment name and its single generic argument, if any.
fn split_type(ty: &Type) -> Option<(String, Option<&Type>)> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    let arg = match &segment.arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        }),
        _ => None,
    };
    Some((segment.ident.to_string(), arg))
}

fn type_name(ty: &Type) -> Option<String> {
    split_type(ty).map(|(name, _)| name)
}

fn field_binding(shape: &syn::Ident, field: &Field, attrs: &FieldAttrs) -> syn::Result<TokenStream2> {
    let ident = field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
    let field_name = ident.unraw().to_string();
    let binding = quote! { ::kontent_delivery::projection::FieldBinding::<#shape> };

    if attrs.read_only {
        return Ok(quote! { #binding::read_only(#field_name) });
    }

    // Option<X> assigns Some(value) to the field.
    let (ty, wrap_some) = match split_type(&field.ty) {
        Some((name, Some(inner))) if name == "Option" => (inner, true),
        _ => (&field.ty, false),
    };
    let assign = if wrap_some {
        quote! { |target, value| target.#ident = ::std::option::Option::Some(value) }
    } else {
        quote! { |target, value| target.#ident = value }
    };

    let Some((name, arg)) = split_type(ty) else {
        return Err(syn::Error::new_spanned(
            &field.ty,
            "unsupported field type; mark it #[kontent(skip)]",
        ));
    };
    let constructor = match (name.as_str(), arg) {
        _ if attrs.force_value => quote! { element::<#ty> },
        ("System", _) => quote! { system },
        ("ContentItem", _) => quote! { linked_content_item },
        ("DynamicItem", _) => quote! { linked_dynamic },
        ("Vec", Some(arg)) => match type_name(arg).as_deref() {
            Some("ContentItem") => quote! { content_item_list },
            Some("DynamicItem") => quote! { dynamic_list },
            Some(inner) if !attrs.force_shape && VALUE_LISTS.contains(&inner) => {
                quote! { element::<#ty> }
            }
            _ => quote! { list::<#arg> },
        },
        ("KeyedMap", Some(arg)) => match type_name(arg).as_deref() {
            Some("ContentItem") => quote! { content_item_map },
            Some("DynamicItem") => quote! { dynamic_map },
            _ => quote! { map::<#arg> },
        },
        (scalar, _) if !attrs.force_shape && SCALARS.contains(&scalar) => {
            quote! { element::<#ty> }
        }
        _ => quote! { linked_item::<#ty> },
    };

    let mut tokens = quote! { #binding::#constructor(#field_name, #assign) };
    if let Some(codename) = &attrs.element {
        tokens = quote! { #tokens.bind_element(#codename) };
    }
    if let Some(codename) = &attrs.linked_item {
        tokens = quote! { #tokens.bind_linked_item(#codename) };
    }
    Ok(tokens)
}
