use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse::Parse, parse::ParseStream, parse_macro_input, Attribute, ImplItem, ItemImpl, LitStr,
    Token,
};

const ROUTE_ATTRS: [&str; 6] = ["route", "get", "post", "put", "delete", "patch"];

/// `("/path", name = "route_name")`, both parts optional.
struct RouteArgs {
    path: Option<String>,
    name: Option<String>,
}

impl Parse for RouteArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut path = None;
        let mut name = None;

        if input.peek(LitStr) {
            let lit: LitStr = input.parse()?;
            path = Some(lit.value());
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }
        while !input.is_empty() {
            let key: syn::Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            let lit: LitStr = input.parse()?;
            match key.to_string().as_str() {
                "path" => path = Some(lit.value()),
                "name" => name = Some(lit.value()),
                _ => return Err(syn::Error::new(key.span(), "expected `path` or `name`")),
            }
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }
        Ok(RouteArgs { path, name })
    }
}

struct MethodInfo {
    fn_name: String,
    name: Option<String>,
    paths: Vec<String>,
}

fn is_route_attr(attr: &Attribute) -> bool {
    attr.path()
        .get_ident()
        .is_some_and(|ident| ROUTE_ATTRS.iter().any(|a| ident == a))
}

pub fn routes_attribute(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemImpl);
    match generate_routes_impl(input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(e) => TokenStream::from(e.to_compile_error()),
    }
}

fn generate_routes_impl(mut input: ItemImpl) -> syn::Result<TokenStream2> {
    let mut methods = Vec::new();

    for item in input.items.iter_mut() {
        let ImplItem::Fn(method) = item else {
            continue;
        };

        let mut info = MethodInfo {
            fn_name: method.sig.ident.to_string(),
            name: None,
            paths: Vec::new(),
        };
        let mut declared = false;
        for attr in method.attrs.iter().filter(|a| is_route_attr(a)) {
            declared = true;
            let args = match &attr.meta {
                syn::Meta::Path(_) => RouteArgs { path: None, name: None },
                _ => attr.parse_args::<RouteArgs>()?,
            };
            if let Some(path) = args.path {
                info.paths.push(path);
            }
            if args.name.is_some() {
                info.name = args.name;
            }
        }
        if declared {
            method.attrs.retain(|attr| !is_route_attr(attr));
            methods.push(info);
        }
    }

    let declarations = methods.iter().map(|m| {
        let fn_name = &m.fn_name;
        let name = m.name.iter();
        let paths = &m.paths;
        quote! {
            ::pageroute::controller::MethodRoute::new(#fn_name)
                #(.name(#name))*
                #(.path(#paths))*
        }
    });

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        #input

        impl #impl_generics ::pageroute::controller::RouteDeclarations for #self_ty #where_clause {
            fn method_routes() -> ::std::vec::Vec<::pageroute::controller::MethodRoute> {
                ::std::vec![#(#declarations),*]
            }
        }
    })
}
