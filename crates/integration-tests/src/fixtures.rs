//! Storefront page markup.

/// Header shared by every page: the menu toggle, the navigation and the
/// cart badge.
const HEADER: &str = r#"
<header class="site-header">
  <a class="logo" href="index.html">Mignon</a>
  <button id="menu-toggle" aria-expanded="false" aria-controls="nav-list">Menu</button>
  <ul id="nav-list" class="nav">
    <li><a href="index.html">Boutique</a></li>
    <li><a href="cart.html">Panier (<span id="cart-count">0</span>)</a></li>
  </ul>
</header>
"#;

/// Catalog page.
///
/// - `p1` and `p2` carry full `data-*` attributes
/// - `p3` only has its visible content, so its name comes from the heading
///   and its price is scraped from `Prix : 1.234,56€`
/// - `p4` has neither a name nor a price anywhere
/// - `#orphan-add` is an add-to-cart control outside any card
#[must_use]
pub fn catalog_page() -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head><meta charset="utf-8"><title>Mignon - Boutique</title></head>
<body class="page-shop">
{HEADER}
<main>
  <section class="products">
    <article class="product-card" data-id="p1" data-name="Filet" data-price="12.5">
      <img src="img/filet.jpg" alt="Filet">
      <h3>Filet</h3>
      <p class="price">12,50 €</p>
      <button class="add-to-cart" id="add-p1">Ajouter au panier</button>
    </article>
    <article class="product-card" data-id="p2" data-name="Entrecôte" data-price="24.9">
      <img src="img/entrecote.jpg" alt="">
      <h3>Entrecôte</h3>
      <p class="price">24,90 €</p>
      <button class="add-to-cart" id="add-p2">Ajouter au panier</button>
    </article>
    <article class="product-card" data-id="p3">
      <img src="img/cote.jpg" alt="">
      <h3>Côte de boeuf</h3>
      <p class="price">Prix : 1.234,56€</p>
      <button class="add-to-cart" id="add-p3"><span class="label">Ajouter</span></button>
    </article>
    <article class="product-card" data-id="p4">
      <button class="add-to-cart" id="add-p4">Ajouter au panier</button>
    </article>
  </section>
  <button class="add-to-cart" id="orphan-add">Ajouter</button>
</main>
</body>
</html>"#
    )
}

/// Cart page with an empty row container and the checkout form.
#[must_use]
pub fn cart_page() -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head><meta charset="utf-8"><title>Mignon - Panier</title></head>
<body class="page-cart">
{HEADER}
<main>
  <h1>Votre panier</h1>
  <div id="cart-items"></div>
  <p id="cart-empty" class="notice hidden">Votre panier est vide.</p>
  <p class="cart-total">Total : <strong id="cart-total">0,00 €</strong></p>
  <form id="checkout-form">
    <input name="name" placeholder="Nom">
    <input type="email" name="email" placeholder="Email">
    <textarea name="address"></textarea>
    <select name="delivery">
      <option value="pickup">Retrait en boutique</option>
      <option value="home">Livraison</option>
    </select>
    <input type="checkbox" name="newsletter" value="yes">
    <button type="submit" id="place-order">Commander</button>
  </form>
</main>
</body>
</html>"#
    )
}

/// Cart page whose configuration block overrides the storage key and the
/// feedback delay.
#[must_use]
pub fn configured_cart_page(config_json: &str) -> String {
    cart_page().replacen(
        "<main>",
        &format!(
            r#"<script type="application/json" id="mignon-config">{config_json}</script>
<main>"#
        ),
        1,
    )
}

/// Stored cart JSON holding one line.
#[must_use]
pub fn stored_line(id: &str, name: &str, price: f64, qty: u32) -> String {
    serde_json::json!([{
        "id": id,
        "name": name,
        "price": price,
        "img": format!("img/{id}.jpg"),
        "qty": qty,
        "addedAt": 1_700_000_000_000_i64,
    }])
    .to_string()
}
