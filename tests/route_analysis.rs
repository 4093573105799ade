use nextjs_vite_converter::{analyze_routes, convert_routes, render_route_module, RouteAnalyzer};
use pretty_assertions::assert_eq;

const SHOP: &[&str] = &[
    "pages/_app.tsx",
    "pages/index.tsx",
    "pages/about.tsx",
    "pages/api/cart.ts",
    "pages/products/_layout.tsx",
    "pages/products/index.tsx",
    "pages/products/[id].tsx",
    "pages/products/[id]/reviews.tsx",
    "pages/docs/[[...slug]].tsx",
    "components/Header.tsx",
];

#[test]
fn shop_routes_in_input_order() {
    let routes = analyze_routes(SHOP);
    let paths: Vec<&str> = routes.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["/", "/about", "/products", "/products/:id", "/products/:id/reviews", "/docs/*"]
    );
    assert_eq!(routes[4].params, vec!["id"]);
    assert!(routes[5].is_optional_catch_all);
    assert!(routes.iter().all(|r| r.layout.is_none() || r.path.starts_with("/products")));
}

#[test]
fn shop_table_nests_products_under_layout() {
    let table = convert_routes(&analyze_routes(SHOP));
    let top: Vec<Option<&str>> = table.iter().map(|e| e.path.as_deref()).collect();
    assert_eq!(top, vec![Some("/"), Some("/about"), Some("/products"), Some("/docs/*")]);

    let products = &table[2];
    assert_eq!(products.component, "ProductsLayout");
    let children: Vec<(bool, Option<&str>, &str)> = products
        .children
        .iter()
        .map(|c| (c.index, c.path.as_deref(), c.component.as_str()))
        .collect();
    assert_eq!(
        children,
        vec![
            (true, None, "Products"),
            (false, Some(":id"), "ProductsId"),
            (false, Some(":id/reviews"), "ProductsIdReviews"),
        ]
    );
}

#[test]
fn rendered_module_is_stable() {
    let table = convert_routes(&analyze_routes(SHOP));
    let first = render_route_module(&table);
    assert_eq!(first, render_route_module(&convert_routes(&analyze_routes(SHOP))));
    assert!(first.contains("import type { RouteObject } from \"react-router-dom\";"));
    assert!(first.contains("const DocsSlug = lazy(() => import(\"/pages/docs/[[...slug]]\"));"));
    assert_eq!(first.matches("lazy(() =>").count(), 7);
}

#[test]
fn custom_pages_root() {
    let routes = RouteAnalyzer::new("src/pages").analyze(&["src/pages/index.tsx", "src/pages/team/[member].jsx"]);
    let paths: Vec<&str> = routes.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["/", "/team/:member"]);
}
