use std::net::SocketAddr;
use std::sync::Arc;

use chrono::NaiveDate;
use rungear_commerce::dates::FixedClock;
use rungear_commerce::gateway::MemoryGateway;
use rungear_server::{build_router, AppState, ShopConfig};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

struct Reply {
    status: u16,
    head: String,
    body: String,
}

impl Reply {
    fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then_some(value.trim())
        })
    }

    fn session_cookie(&self) -> Option<String> {
        let cookie = self.header("set-cookie")?;
        cookie.split(';').next().map(ToString::to_string)
    }

    fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("json body")
    }
}

async fn send_raw(
    addr: SocketAddr,
    method: &str,
    path: &str,
    cookie: Option<&str>,
    form: Option<&str>,
) -> Reply {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    if let Some(cookie) = cookie {
        req.push_str(&format!("Cookie: {cookie}\r\n"));
    }
    let body = form.unwrap_or("");
    if form.is_some() {
        req.push_str("Content-Type: application/x-www-form-urlencoded\r\n");
        req.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    req.push_str("\r\n");
    req.push_str(body);

    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("status");
    Reply {
        status,
        head: head.to_string(),
        body: body.to_string(),
    }
}

async fn spawn_shop() -> SocketAddr {
    let mut config = ShopConfig::default();
    config.server.default_member_id = Some(1001);
    let gateway = Arc::new(MemoryGateway::with_demo_data());
    // 2024-03-01 is a Friday.
    let clock = Arc::new(FixedClock(NaiveDate::from_ymd_opt(2024, 3, 1).expect("date")));
    let app = build_router(AppState::with_clock(gateway, clock, &config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    addr
}

/// Open a session and return its cookie and anti-forgery token.
async fn start_session(addr: SocketAddr) -> (String, String) {
    let reply = send_raw(addr, "GET", "/shop", None, None).await;
    assert_eq!(reply.status, 200);
    let cookie = reply.session_cookie().expect("session cookie");
    let token = reply.json()["csrfToken"]
        .as_str()
        .expect("csrf token")
        .to_string();
    (cookie, token)
}

#[tokio::test]
async fn test_healthz_and_request_id() {
    let addr = spawn_shop().await;
    let reply = send_raw(addr, "GET", "/healthz", None, None).await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, "ok");
    assert_eq!(reply.header("x-request-id").map(str::len), Some(16));
}

#[tokio::test]
async fn test_shop_page_filters() {
    let addr = spawn_shop().await;
    let reply = send_raw(
        addr,
        "GET",
        "/shop?categories=Apparel&sortBy=price_asc",
        None,
        None,
    )
    .await;
    assert_eq!(reply.status, 200);

    let page = reply.json();
    let products = page["products"].as_array().expect("products");
    assert_eq!(products.len(), 3);
    assert!(products.iter().all(|p| p["category"] == "Apparel"));
    assert_eq!(products[0]["name"], "Dri-FIT Miler Tee");
    assert_eq!(products[0]["discountPercent"], 0);
    assert_eq!(products[1]["name"], "Own The Run Shorts");
    assert_eq!(products[1]["discountPercent"], 18);
    assert_eq!(products[1]["originalPrice"]["amountCents"], 220_000);
    assert_eq!(page["categoryTitle"], "Running Gear");
    assert_eq!(page["filter"]["sortBy"], "price_asc");
    assert_eq!(page["cartCount"], 0);
}

#[tokio::test]
async fn test_post_without_token_is_forbidden() {
    let addr = spawn_shop().await;
    let (cookie, _) = start_session(addr).await;

    let reply = send_raw(
        addr,
        "POST",
        "/shop/cart/add",
        Some(&cookie),
        Some("productId=7&quantity=1&csrfToken=forged"),
    )
    .await;
    assert_eq!(reply.status, 403);
    assert_eq!(reply.json()["error"], "invalid anti-forgery token");

    let cart = send_raw(addr, "GET", "/shop/cart", Some(&cookie), None).await;
    assert_eq!(cart.json()["items"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_empty_cart_checkout_redirects() {
    let addr = spawn_shop().await;
    let (cookie, _) = start_session(addr).await;

    let reply = send_raw(addr, "GET", "/shop/checkout", Some(&cookie), None).await;
    assert_eq!(reply.status, 303);
    assert_eq!(reply.header("location"), Some("/shop/cart"));

    let cart = send_raw(addr, "GET", "/shop/cart", Some(&cookie), None).await;
    assert_eq!(cart.json()["flash"][0]["text"], "Your cart is empty.");
}

#[tokio::test]
async fn test_unknown_product_is_bad_request() {
    let addr = spawn_shop().await;
    let (cookie, token) = start_session(addr).await;

    let form = format!("productId=999&quantity=1&csrfToken={token}");
    let reply = send_raw(addr, "POST", "/shop/cart/add", Some(&cookie), Some(&form)).await;
    assert_eq!(reply.status, 400);
}

#[tokio::test]
async fn test_quantity_updates_and_removal() {
    let addr = spawn_shop().await;
    let (cookie, token) = start_session(addr).await;

    let form = format!("productId=3&csrfToken={token}");
    send_raw(addr, "POST", "/shop/cart/add", Some(&cookie), Some(&form)).await;
    let cart = send_raw(addr, "GET", "/shop/cart", Some(&cookie), None).await.json();
    let line = cart["items"][0]["id"].as_i64().expect("line id");
    assert_eq!(cart["items"][0]["quantity"], 1);

    let form = format!("cartItemId={line}&action=increase&csrfToken={token}");
    let reply = send_raw(addr, "POST", "/shop/cart/update-qty", Some(&cookie), Some(&form)).await;
    assert_eq!(reply.status, 303);
    assert_eq!(reply.header("location"), Some("/shop/cart"));
    let cart = send_raw(addr, "GET", "/shop/cart", Some(&cookie), None).await.json();
    assert_eq!(cart["items"][0]["quantity"], 2);

    let form = format!("cartItemId={line}&csrfToken={token}");
    let reply = send_raw(addr, "POST", "/shop/cart/remove", Some(&cookie), Some(&form)).await;
    assert_eq!(reply.status, 303);
    let cart = send_raw(addr, "GET", "/shop/cart", Some(&cookie), None).await.json();
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(0));
    assert_eq!(cart["shippingFee"]["amountCents"], 0);
}

#[tokio::test]
async fn test_invalid_promo_flashes_error() {
    let addr = spawn_shop().await;
    let (cookie, token) = start_session(addr).await;

    let form = format!("promoCode=EXPIRED&csrfToken={token}");
    let reply = send_raw(addr, "POST", "/shop/cart/promo", Some(&cookie), Some(&form)).await;
    assert_eq!(reply.status, 303);

    let cart = send_raw(addr, "GET", "/shop/cart", Some(&cookie), None).await.json();
    assert_eq!(cart["flash"][0]["kind"], "error");
    assert_eq!(cart["flash"][0]["text"], "Invalid or expired promo code.");
    assert_eq!(cart["discount"]["amountCents"], 0);
}

#[tokio::test]
async fn test_add_to_cart_through_confirmation() {
    let addr = spawn_shop().await;
    let (cookie, token) = start_session(addr).await;

    // Add two tees.
    let form = format!("productId=7&quantity=2&csrfToken={token}");
    let reply = send_raw(addr, "POST", "/shop/cart/add", Some(&cookie), Some(&form)).await;
    assert_eq!(reply.status, 303);
    assert_eq!(reply.header("location"), Some("/shop"));

    let shop = send_raw(addr, "GET", "/shop", Some(&cookie), None).await.json();
    assert_eq!(shop["cartCount"], 2);
    assert_eq!(shop["flash"][0]["text"], "Item added to cart!");
    let shop = send_raw(addr, "GET", "/shop", Some(&cookie), None).await.json();
    assert_eq!(shop["flash"].as_array().map(Vec::len), Some(0));

    // Apply a promo.
    let form = format!("promoCode=RUN10&csrfToken={token}");
    let reply = send_raw(addr, "POST", "/shop/cart/promo", Some(&cookie), Some(&form)).await;
    assert_eq!(reply.status, 303);
    assert_eq!(reply.header("location"), Some("/shop/cart"));

    let cart = send_raw(addr, "GET", "/shop/cart", Some(&cookie), None).await.json();
    assert_eq!(cart["flash"][0]["text"], "Promo code applied! You saved ₱500.");
    assert_eq!(cart["subtotal"]["amountCents"], 299_000);
    assert_eq!(cart["shippingFee"]["amountCents"], 15_000);
    assert_eq!(cart["discount"]["amountCents"], 50_000);
    assert_eq!(cart["total"]["amountCents"], 264_000);
    assert_eq!(cart["promoCode"], "RUN10");

    // Card payment with blank card fields is redisplayed.
    let checkout = send_raw(addr, "GET", "/shop/checkout", Some(&cookie), None).await;
    assert_eq!(checkout.status, 200);
    let form = format!(
        "fullName=Ana+Cruz&email=ana%40example.com&phone=09171234567&address=1+Rizal+St\
         &city=Makati&postalCode=1200&deliveryOption=Standard&paymentMethod=Card\
         &csrfToken={token}"
    );
    let reply = send_raw(addr, "POST", "/shop/checkout", Some(&cookie), Some(&form)).await;
    assert_eq!(reply.status, 422);
    let view = reply.json();
    assert_eq!(view["errors"]["cardNumber"][0], "Card number is required.");
    assert_eq!(view["errors"]["cardCvv"][0], "CVV is required.");
    assert!(view["errors"].get("fullName").is_none());
    assert_eq!(view["form"]["fullName"], "Ana Cruz");

    // PayPal needs no card.
    let form = format!(
        "fullName=Ana+Cruz&email=ana%40example.com&phone=09171234567&address=1+Rizal+St\
         &city=Makati&postalCode=1200&deliveryOption=Express&paymentMethod=PayPal\
         &csrfToken={token}"
    );
    let reply = send_raw(addr, "POST", "/shop/checkout", Some(&cookie), Some(&form)).await;
    assert_eq!(reply.status, 303);
    let location = reply.header("location").expect("location").to_string();
    assert!(location.starts_with("/shop/order-confirmation?ticket="));

    let confirmation = send_raw(addr, "GET", &location, Some(&cookie), None).await;
    assert_eq!(confirmation.status, 200);
    let order = confirmation.json();
    assert!(order["orderId"].as_str().expect("order id").starts_with("RG-"));
    assert_eq!(order["status"], "Placed");
    assert_eq!(order["paymentMethod"], "PayPal");
    assert_eq!(order["shippingFee"]["amountCents"], 30_000);
    assert_eq!(order["total"]["amountCents"], 279_000);
    assert_eq!(order["estimatedDelivery"], "2024-03-05");
    assert_eq!(order["items"][0]["productName"], "Dri-FIT Miler Tee");

    // The snapshot is shown once.
    let again = send_raw(addr, "GET", &location, Some(&cookie), None).await;
    assert_eq!(again.status, 303);
    assert_eq!(again.header("location"), Some("/shop"));

    // Cart and promo are cleared.
    let cart = send_raw(addr, "GET", "/shop/cart", Some(&cookie), None).await.json();
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(0));
    assert_eq!(cart["discount"]["amountCents"], 0);
    assert!(cart["promoCode"].is_null());
}

#[tokio::test]
async fn test_confirmation_without_ticket_redirects() {
    let addr = spawn_shop().await;
    let reply = send_raw(addr, "GET", "/shop/order-confirmation", None, None).await;
    assert_eq!(reply.status, 303);
    assert_eq!(reply.header("location"), Some("/shop"));

    let reply = send_raw(addr, "GET", "/shop/orders/RG-2024-000001", None, None).await;
    assert_eq!(reply.status, 303);
    assert_eq!(reply.header("location"), Some("/shop"));
}
