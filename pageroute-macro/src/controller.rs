use darling::{ast::NestedMeta, FromMeta};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Expr, ItemStruct, Lit};

#[derive(Debug, Default, FromMeta)]
struct ControllerArgs {
    path: Option<String>,
    name: Option<String>,
    bundle: Option<String>,
    template_dir: Option<String>,
    #[darling(default)]
    template_routes: bool,
    extends: Option<Expr>,
    #[darling(default)]
    abstract_controller: bool,
}

pub fn controller_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr_args = match NestedMeta::parse_meta_list(attr.into()) {
        Ok(args) => args,
        Err(e) => return TokenStream::from(darling::Error::from(e).write_errors()),
    };
    let args = match ControllerArgs::from_list(&attr_args) {
        Ok(args) => args,
        Err(e) => return TokenStream::from(e.write_errors()),
    };
    let input = parse_macro_input!(item as ItemStruct);

    match generate_controller_impl(&args, &input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(e) => TokenStream::from(e.to_compile_error()),
    }
}

fn generate_controller_impl(args: &ControllerArgs, input: &ItemStruct) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut calls = Vec::new();
    if let Some(bundle) = &args.bundle {
        calls.push(quote! { .bundle(#bundle) });
    }
    if let Some(dir) = &args.template_dir {
        calls.push(quote! { .template_dir(#dir) });
    }
    if args.template_routes {
        calls.push(quote! { .template_routes() });
    }
    if args.abstract_controller {
        calls.push(quote! { .abstract_controller() });
    }
    if let Some(parent) = &args.extends {
        let parent = parent_path(parent)?;
        calls.push(quote! { .extends(::std::any::type_name::<#parent>()) });
    }
    if args.path.is_some() || args.name.is_some() {
        let name = args.name.iter();
        let path = args.path.iter();
        calls.push(quote! {
            .class_route(
                ::pageroute::controller::ClassRoute::new()
                    #(.name(#name))*
                    #(.path(#path))*
            )
        });
    }

    Ok(quote! {
        #input

        impl #impl_generics ::pageroute::controller::Controller for #struct_name #ty_generics #where_clause {
            fn registration() -> ::pageroute::controller::ControllerRegistration {
                ::pageroute::controller::ControllerRegistration::new(::std::any::type_name::<Self>())
                    #(#calls)*
            }
        }
    })
}

/// Accepts both `extends = Parent` and `extends = "Parent"`.
fn parent_path(expr: &Expr) -> syn::Result<syn::Path> {
    match expr {
        Expr::Path(path) => Ok(path.path.clone()),
        Expr::Lit(lit) => match &lit.lit {
            Lit::Str(s) => s.parse(),
            other => Err(syn::Error::new_spanned(other, "expected a type path")),
        },
        other => Err(syn::Error::new_spanned(other, "expected a type path")),
    }
}
