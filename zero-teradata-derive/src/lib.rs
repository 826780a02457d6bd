use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Meta, parse_macro_input};

/// Derive macro for `FromRecord` trait.
///
/// Generates an implementation that matches column names to struct fields.
/// Column names are compared case-insensitively.
///
/// # Example
///
/// ```ignore
/// #[derive(FromRecord)]
/// struct Employee {
///     name: String,
///     salary: Option<i32>,
/// }
/// ```
///
/// # Strict Mode
///
/// By default, unknown columns are silently skipped. Use
/// `#[from_record(strict)]` to error on unknown columns:
///
/// ```ignore
/// #[derive(FromRecord)]
/// #[from_record(strict)]
/// struct Employee {
///     name: String,
///     salary: Option<i32>,
/// }
/// ```
#[proc_macro_derive(FromRecord, attributes(from_record))]
pub fn derive_from_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    // Check for #[from_record(strict)]
    let strict = input.attrs.iter().any(|attr| {
        if !attr.path().is_ident("from_record") {
            return false;
        }
        match &attr.meta {
            Meta::List(list) => list.tokens.to_string().contains("strict"),
            _ => false,
        }
    });

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new(
                    input.ident.span(),
                    "FromRecord only supports structs with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new(input.ident.span(), "FromRecord only supports structs")
                .to_compile_error()
                .into();
        }
    };

    let field_names: Vec<_> = fields.iter().filter_map(|f| f.ident.as_ref()).collect();
    let field_types: Vec<_> = fields.iter().map(|f| &f.ty).collect();
    let field_name_strs: Vec<_> = field_names
        .iter()
        .map(|n| n.to_string().trim_start_matches("r#").to_string())
        .collect();
    let field_name_lower: Vec<_> = field_name_strs.iter().map(|n| n.to_lowercase()).collect();

    let field_inits = field_names
        .iter()
        .zip(field_types.iter())
        .zip(field_name_strs.iter())
        .map(|((name, ty), name_str)| {
            quote! {
                #name: {
                    let __value = __record
                        .metadata()
                        .position(#name_str)
                        .and_then(|__i| __record.values().get(__i))
                        .ok_or(::zero_teradata::error::Error::MissingColumn(#name_str))?;
                    <#ty as ::zero_teradata::value::FromValue>::from_value(__value)?
                }
            }
        });

    let strict_check = if strict {
        quote! {
            let __known: &[&str] = &[#(#field_name_lower),*];
            for __key in __record.keys() {
                if !__known.contains(&__key.to_lowercase().as_str()) {
                    return Err(::zero_teradata::error::Error::UnknownColumn(__key.to_string()));
                }
            }
        }
    } else {
        quote! {}
    };

    let expanded = quote! {
        impl #impl_generics ::zero_teradata::record::FromRecord for #name #ty_generics #where_clause {
            fn from_record(
                __record: &::zero_teradata::record::Record,
            ) -> ::zero_teradata::error::Result<Self> {
                #strict_check

                Ok(Self {
                    #(#field_inits),*
                })
            }
        }
    };

    TokenStream::from(expanded)
}
