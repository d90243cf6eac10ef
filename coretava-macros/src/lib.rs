//! `#[derive(Request)]` for effect request types.
//!
//! Requests carry continuation closures (`returns`) that cannot be printed,
//! and payloads that may hold customer identifiers. The derive emits a
//! `Debug` impl that leaves out `returns`, prints `#[redact]` fields as
//! `<redacted>`, and prints `#[redact(with = path)]` fields through
//! `path(&field)`, so requests can flow through `tracing` observers safely.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields, Ident, Meta, Path};

#[proc_macro_derive(Request, attributes(redact))]
pub fn derive_request(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident.clone();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(data) => struct_body(&name, &data.fields),
        Data::Enum(data) => data
            .variants
            .iter()
            .map(|v| variant_arm(&name, &v.ident, &v.fields))
            .collect::<syn::Result<Vec<_>>>()
            .map(|arms| {
                quote! {
                    match self {
                        #(#arms),*
                    }
                }
            }),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &name,
            "Request derive does not support unions",
        )),
    };
    let body = match body {
        Ok(body) => body,
        Err(err) => return err.to_compile_error().into(),
    };

    quote! {
        impl #impl_generics ::std::fmt::Debug for #name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                #body
            }
        }
    }
    .into()
}

enum Treatment {
    Show,
    Redact,
    RedactWith(Path),
    Skip,
}

fn treatment(field: &Field) -> syn::Result<Treatment> {
    if field.ident.as_ref().is_some_and(|id| id == "returns") {
        return Ok(Treatment::Skip);
    }
    let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("redact")) else {
        return Ok(Treatment::Show);
    };
    if let Meta::Path(_) = attr.meta {
        return Ok(Treatment::Redact);
    }
    let mut with = None;
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("with") {
            with = Some(meta.value()?.parse::<Path>()?);
            Ok(())
        } else {
            Err(meta.error("expected `with = path::to::fn`"))
        }
    })?;
    Ok(with.map_or(Treatment::Redact, Treatment::RedactWith))
}

fn field_value(field: &Field, access: TokenStream2) -> syn::Result<Option<TokenStream2>> {
    Ok(match treatment(field)? {
        Treatment::Show => Some(access),
        Treatment::Redact => Some(quote! { &format_args!("<redacted>") }),
        Treatment::RedactWith(path) => Some(quote! { &#path(#access) }),
        Treatment::Skip => None,
    })
}

fn struct_body(name: &Ident, fields: &Fields) -> syn::Result<TokenStream2> {
    Ok(match fields {
        Fields::Named(named) => {
            let mut writes = Vec::new();
            for fld in &named.named {
                let Some(id) = fld.ident.as_ref() else { continue };
                if let Some(value) = field_value(fld, quote! { &self.#id })? {
                    writes.push(quote! { .field(stringify!(#id), #value) });
                }
            }
            quote! {
                f.debug_struct(stringify!(#name))
                    #(#writes)*
                    .finish()
            }
        }
        Fields::Unnamed(unnamed) => {
            let mut writes = Vec::new();
            for (i, fld) in unnamed.unnamed.iter().enumerate() {
                let idx = syn::Index::from(i);
                if let Some(value) = field_value(fld, quote! { &self.#idx })? {
                    writes.push(quote! { .field(#value) });
                }
            }
            quote! {
                f.debug_tuple(stringify!(#name))
                    #(#writes)*
                    .finish()
            }
        }
        Fields::Unit => quote! { f.write_str(stringify!(#name)) },
    })
}

fn variant_arm(name: &Ident, variant: &Ident, fields: &Fields) -> syn::Result<TokenStream2> {
    Ok(match fields {
        Fields::Unit => {
            quote! { #name::#variant => f.write_str(concat!(stringify!(#name), "::", stringify!(#variant))) }
        }
        Fields::Unnamed(unnamed) => {
            let bindings: Vec<_> = (0..unnamed.unnamed.len())
                .map(|i| format_ident!("f{}", i))
                .collect();
            let mut writes = Vec::new();
            for (fld, b) in unnamed.unnamed.iter().zip(&bindings) {
                if let Some(value) = field_value(fld, quote! { #b })? {
                    writes.push(quote! { d.field(#value); });
                }
            }
            quote! {
                #name::#variant( #( #bindings ),* ) => {
                    let mut d = f.debug_tuple(concat!(stringify!(#name), "::", stringify!(#variant)));
                    #(#writes)*
                    let _ = ( #( &#bindings, )* );
                    d.finish()
                }
            }
        }
        Fields::Named(named) => {
            let bindings: Vec<_> = named.named.iter().filter_map(|fld| fld.ident.clone()).collect();
            let mut writes = Vec::new();
            for fld in &named.named {
                let Some(id) = fld.ident.as_ref() else { continue };
                if let Some(value) = field_value(fld, quote! { #id })? {
                    writes.push(quote! { d.field(stringify!(#id), #value); });
                }
            }
            quote! {
                #name::#variant { #( #bindings ),* } => {
                    let mut d = f.debug_struct(concat!(stringify!(#name), "::", stringify!(#variant)));
                    #(#writes)*
                    let _ = ( #( &#bindings, )* );
                    d.finish()
                }
            }
        }
    })
}
