use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::{
    Attribute, Data, DeriveInput, Fields, FnArg, GenericArgument, ImplItem, ImplItemFn, ItemImpl,
    LitStr, PathArguments, ReturnType, Token, Type, Visibility, parse_macro_input,
    spanned::Spanned,
};

#[proc_macro_derive(Patchable, attributes(patch))]
pub fn derive_patchable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_patchable(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Describes the methods of an inherent impl block so `#[patch(accessors)]`
/// types expose them to the patcher.
#[proc_macro_attribute]
pub fn accessors(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "#[accessors] does not accept arguments",
        )
        .to_compile_error()
        .into();
    }

    let input = parse_macro_input!(item as ItemImpl);
    match expand_accessors(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

// ============================================================================
// #[derive(Patchable)]
// ============================================================================

#[derive(Default)]
struct TypeOptions {
    ignore_if_null: bool,
    log_change: bool,
    accessors: bool,
}

#[derive(Default)]
struct FieldOptions {
    skip: bool,
    ignore: bool,
    ignore_if_null: bool,
    log_change: bool,
    map_to: Option<LitStr>,
    transforms: Vec<LitStr>,
}

fn expand_patchable(input: DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "#[derive(Patchable)] does not support generic types",
        ));
    }

    let data = match &input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new(
                input.span(),
                "#[derive(Patchable)] can only be used on structs",
            ));
        }
    };

    let named = match &data.fields {
        Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
        Fields::Unit => Vec::new(),
        Fields::Unnamed(_) => {
            return Err(syn::Error::new(
                data.fields.span(),
                "#[derive(Patchable)] requires named fields",
            ));
        }
    };

    let options = parse_type_options(&input.attrs)?;

    let mut field_infos = Vec::new();
    for field in named {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let field_options = parse_field_options(&field.attrs)?;
        if field_options.skip {
            continue;
        }

        let name = field_ident.unraw().to_string();
        let info = if matches!(field.vis, Visibility::Public(_)) {
            match option_inner(&field.ty) {
                Some(inner) => quote! {
                    ::rustpatcher::reflect::FieldInfo::optional_field::<#inner>(
                        #name,
                        |owner: &Self| ::core::clone::Clone::clone(&owner.#field_ident),
                        |owner: &mut Self, value: ::core::option::Option<#inner>| owner.#field_ident = value,
                    )
                },
                None => {
                    let ty = &field.ty;
                    quote! {
                        ::rustpatcher::reflect::FieldInfo::field::<#ty>(
                            #name,
                            |owner: &Self| ::core::clone::Clone::clone(&owner.#field_ident),
                            |owner: &mut Self, value: #ty| owner.#field_ident = value,
                        )
                    }
                }
            }
        } else {
            quote!(::rustpatcher::reflect::FieldInfo::hidden(#name))
        };

        field_infos.push(with_field_directives(info, &field_options));
    }

    let type_name = ident.unraw().to_string();
    let ignore_if_null = options.ignore_if_null;
    let log_change = options.log_change;
    let methods = if options.accessors {
        quote!(.with_methods(Self::__rustpatcher_methods()))
    } else {
        quote!()
    };

    Ok(quote! {
        impl ::rustpatcher::reflect::Patchable for #ident {
            fn descriptor() -> ::rustpatcher::reflect::TypeDescriptor<Self> {
                ::rustpatcher::reflect::TypeDescriptor::new(#type_name)
                    .with_directives(::rustpatcher::reflect::TypeDirectives {
                        ignore_if_null: #ignore_if_null,
                        log_change: #log_change,
                    })
                    .with_fields(::std::vec![#(#field_infos),*])
                    #methods
            }
        }
    })
}

fn with_field_directives(info: TokenStream2, options: &FieldOptions) -> TokenStream2 {
    let declared = options.ignore
        || options.ignore_if_null
        || options.log_change
        || options.map_to.is_some()
        || !options.transforms.is_empty();
    if !declared {
        return info;
    }

    let ignore = options.ignore;
    let ignore_if_null = options.ignore_if_null;
    let log_change = options.log_change;
    let map_to = match &options.map_to {
        Some(target) => quote!(::core::option::Option::Some(#target)),
        None => quote!(::core::option::Option::None),
    };
    let transforms = &options.transforms;

    quote! {
        #info.with_directives(::rustpatcher::reflect::FieldDirectives {
            ignore: #ignore,
            ignore_if_null: #ignore_if_null,
            log_change: #log_change,
            map_to: #map_to,
            transforms: &[#(#transforms),*],
        })
    }
}

fn parse_type_options(attrs: &[Attribute]) -> syn::Result<TypeOptions> {
    let mut options = TypeOptions::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("patch")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("ignore_if_null") {
                options.ignore_if_null = true;
                return Ok(());
            }
            if meta.path.is_ident("log_change") {
                options.log_change = true;
                return Ok(());
            }
            if meta.path.is_ident("accessors") {
                options.accessors = true;
                return Ok(());
            }
            Err(meta.error(
                "Unsupported #[patch(...)] type option. Supported: ignore_if_null, log_change, accessors",
            ))
        })?;
    }
    Ok(options)
}

fn parse_field_options(attrs: &[Attribute]) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("patch")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
                return Ok(());
            }
            if meta.path.is_ident("ignore") {
                options.ignore = true;
                return Ok(());
            }
            if meta.path.is_ident("ignore_if_null") {
                options.ignore_if_null = true;
                return Ok(());
            }
            if meta.path.is_ident("log_change") {
                options.log_change = true;
                return Ok(());
            }
            if meta.path.is_ident("map_to") {
                let value = meta.value()?;
                let target: LitStr = value.parse()?;
                if target.value().is_empty() {
                    return Err(meta.error("map_to target must not be empty"));
                }
                options.map_to = Some(target);
                return Ok(());
            }
            if meta.path.is_ident("transform") {
                if meta.input.peek(Token![=]) {
                    let value = meta.value()?;
                    options.transforms.push(value.parse()?);
                } else {
                    let content;
                    syn::parenthesized!(content in meta.input);
                    let keys = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
                    options.transforms.extend(keys);
                }
                return Ok(());
            }
            Err(meta.error(
                "Unsupported #[patch(...)] field option. Supported: skip, ignore, ignore_if_null, log_change, map_to = \"...\", transform = \"...\", transform(\"...\", ...)",
            ))
        })?;
    }
    Ok(options)
}

// ============================================================================
// #[accessors]
// ============================================================================

fn expand_accessors(mut item_impl: ItemImpl) -> syn::Result<TokenStream2> {
    if item_impl.trait_.is_some() {
        return Err(syn::Error::new(
            item_impl.span(),
            "#[accessors] can only be used on inherent impl blocks",
        ));
    }
    if !item_impl.generics.params.is_empty() {
        return Err(syn::Error::new(
            item_impl.generics.span(),
            "#[accessors] does not support generic impl blocks",
        ));
    }

    let mut method_infos = Vec::new();
    for item in &mut item_impl.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let skip = take_method_skip(method)?;
        if !skip {
            method_infos.push(describe_method(method));
        }
    }

    let self_ty = &item_impl.self_ty;
    Ok(quote! {
        #item_impl

        impl #self_ty {
            #[doc(hidden)]
            pub fn __rustpatcher_methods() -> ::std::vec::Vec<::rustpatcher::reflect::MethodInfo<Self>> {
                ::std::vec![#(#method_infos),*]
            }
        }
    })
}

/// Removes `#[patch(...)]` from a method and reports whether it asked to be skipped.
fn take_method_skip(method: &mut ImplItemFn) -> syn::Result<bool> {
    let mut skip = false;
    let mut kept = Vec::with_capacity(method.attrs.len());
    for attr in method.attrs.drain(..) {
        if !attr.path().is_ident("patch") {
            kept.push(attr);
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                return Ok(());
            }
            Err(meta.error("Unsupported #[patch(...)] method option. Supported: skip"))
        })?;
    }
    method.attrs = kept;
    Ok(skip)
}

fn describe_method(method: &ImplItemFn) -> TokenStream2 {
    let ident = &method.sig.ident;
    let name = ident.unraw().to_string();
    let public = matches!(method.vis, Visibility::Public(_));

    let receiver = match method.sig.inputs.first() {
        Some(FnArg::Receiver(receiver)) if receiver.reference.is_some() => {
            if receiver.mutability.is_some() {
                Receiver::RefMut
            } else {
                Receiver::Ref
            }
        }
        Some(FnArg::Receiver(_)) => Receiver::Owned,
        _ => Receiver::Static,
    };
    let params: Vec<&Type> = method
        .sig
        .inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Typed(pat) => Some(pat.ty.as_ref()),
            FnArg::Receiver(_) => None,
        })
        .collect();

    let plain = public
        && method.sig.generics.params.is_empty()
        && method.sig.asyncness.is_none()
        && method.sig.unsafety.is_none();

    if plain && receiver == Receiver::Ref && params.is_empty() && is_getter_name(&name) {
        if let ReturnType::Type(_, ty) = &method.sig.output {
            if is_owned_value(ty) {
                return describe_getter(&name, ident, ty);
            }
        }
    }

    if plain && receiver == Receiver::RefMut && params.len() == 1 && name.starts_with("set_") {
        let ty = params[0];
        if is_owned_value(ty) {
            return describe_setter(&name, ident, ty, &method.sig.output);
        }
    }

    let receiver = receiver.tokens();
    let arity = params.len();
    quote! {
        ::rustpatcher::reflect::MethodInfo::opaque(#name, #public, #receiver, #arity)
    }
}

fn describe_getter(name: &str, ident: &syn::Ident, ty: &Type) -> TokenStream2 {
    match option_inner(ty) {
        Some(inner) => quote! {
            ::rustpatcher::reflect::MethodInfo::optional_getter::<#inner>(
                #name,
                |owner: &Self| owner.#ident(),
            )
        },
        None => quote! {
            ::rustpatcher::reflect::MethodInfo::getter::<#ty>(
                #name,
                |owner: &Self| owner.#ident(),
            )
        },
    }
}

/// Setters may return `()`, a `Result` whose error becomes the write error, or
/// any other value. Such a value carries no write outcome and is dropped, the
/// way `set_*` methods returning the previous value are used as plain setters.
fn describe_setter(name: &str, ident: &syn::Ident, ty: &Type, output: &ReturnType) -> TokenStream2 {
    let call = match output {
        ReturnType::Default => quote! {
            owner.#ident(value);
            ::core::result::Result::Ok(())
        },
        ReturnType::Type(_, returned) if last_segment_is(returned, "Result") => quote! {
            owner
                .#ident(value)
                .map(|_| ())
                .map_err(::core::convert::Into::into)
        },
        ReturnType::Type(..) => quote! {
            let _previous = owner.#ident(value);
            ::core::result::Result::Ok(())
        },
    };

    let constructor = match option_inner(ty) {
        Some(inner) => quote!(optional_setter::<#inner>),
        None => quote!(setter::<#ty>),
    };

    quote! {
        ::rustpatcher::reflect::MethodInfo::#constructor(
            #name,
            |owner: &mut Self, value: #ty| -> ::core::result::Result<(), ::rustpatcher::core::BoxError> {
                #call
            },
        )
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Receiver {
    Static,
    Ref,
    RefMut,
    Owned,
}

impl Receiver {
    fn tokens(self) -> TokenStream2 {
        match self {
            Self::Static => quote!(::rustpatcher::reflect::MethodReceiver::Static),
            Self::Ref => quote!(::rustpatcher::reflect::MethodReceiver::Ref),
            Self::RefMut => quote!(::rustpatcher::reflect::MethodReceiver::RefMut),
            Self::Owned => quote!(::rustpatcher::reflect::MethodReceiver::Owned),
        }
    }
}

fn is_getter_name(name: &str) -> bool {
    name.starts_with("get_") || name.starts_with("is_")
}

/// Types a generated invoker can move in or out: no references, no `impl Trait`,
/// no borrowed lifetimes and not `()`.
fn is_owned_value(ty: &Type) -> bool {
    match ty {
        Type::Reference(_) | Type::ImplTrait(_) | Type::TraitObject(_) | Type::Never(_) => false,
        Type::Tuple(tuple) if tuple.elems.is_empty() => false,
        Type::Paren(inner) => is_owned_value(&inner.elem),
        _ => !quote!(#ty).to_string().contains('\''),
    }
}

fn last_segment_is(ty: &Type, ident: &str) -> bool {
    match ty {
        Type::Path(path) if path.qself.is_none() => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == ident),
        _ => false,
    }
}

/// `Option<T>` (by last path segment) -> `T`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
