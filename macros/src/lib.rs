use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Derives `peduc_backend::objects::ToFromStore` for a record kept in a sled tree.
///
/// Records are written as CBOR, and encode or decode failures surface as
/// `PeducError::CborError`. The type must be `Serialize + DeserializeOwned`. The generated
/// impl names `crate::` paths, so the derive only works inside `peduc_backend`.
#[proc_macro_derive(StoredObject)]
pub fn stored_object_derive(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    impl_stored_object(&ast)
}

fn impl_stored_object(ast: &DeriveInput) -> TokenStream {
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
    let gen = quote! {
        impl #impl_generics crate::objects::ToFromStore<#name #ty_generics> for #name #ty_generics
        #where_clause
        {
            fn to_object(&self) -> ::std::result::Result<Vec<u8>, crate::errors::PeducError> {
                let mut record = vec![];
                ::ciborium::into_writer(self, &mut record)
                    .map_err(|e| crate::errors::PeducError::CborError(e.to_string()))?;
                Ok(record)
            }

            fn from_object(
                record: &[u8],
            ) -> ::std::result::Result<#name #ty_generics, crate::errors::PeducError> {
                ::ciborium::from_reader(record)
                    .map_err(|e| crate::errors::PeducError::CborError(e.to_string()))
            }
        }
    };
    gen.into()
}
