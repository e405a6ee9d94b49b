//! Attribute inspection for rule implementations.

use syn::Attribute;

/// Checks if attributes contain a `#[test]`-like attribute
/// (`#[test]`, `#[tokio::test]`, `#[rstest]`, ...).
#[must_use]
pub fn has_test_attr(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path()
            .segments
            .last()
            .is_some_and(|seg| seg.ident == "test" || seg.ident == "rstest")
    })
}

/// Checks if attributes contain a `#[cfg(test)]` attribute.
#[must_use]
pub fn has_cfg_test(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        if !attr.path().is_ident("cfg") {
            return false;
        }
        let tokens = quote::quote!(#attr).to_string().replace(' ', "");
        tokens.contains("(test)") || tokens.contains("(test,") || tokens.contains(",test)")
    })
}

/// Checks if an item is test-only code.
#[must_use]
pub fn is_test_item(attrs: &[Attribute]) -> bool {
    has_test_attr(attrs) || has_cfg_test(attrs)
}
