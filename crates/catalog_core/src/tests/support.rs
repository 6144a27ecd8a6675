use anyhow::Result;
use axum::{http::StatusCode, routing::get, Json, Router};
use shared::domain::{Product, ProductId, Rating};
use tokio::net::TcpListener;

pub(crate) fn product(id: i64, title: &str) -> Product {
    Product {
        id: ProductId(id),
        title: title.to_string(),
        price: 10.0 + id as f64,
        description: format!("{title} description"),
        category: "electronics".to_string(),
        image: format!("https://img.example/{id}.png"),
        rating: Rating {
            rate: 4.2,
            count: 10,
        },
    }
}

pub(crate) fn sample_products() -> Vec<Product> {
    vec![
        Product {
            id: ProductId(1),
            title: "Smartphone".to_string(),
            price: 499.0,
            description: "A phone".to_string(),
            category: "electronics".to_string(),
            image: "https://img.example/1.png".to_string(),
            rating: Rating {
                rate: 4.5,
                count: 300,
            },
        },
        Product {
            id: ProductId(2),
            title: "Laptop".to_string(),
            price: 1299.99,
            description: "A laptop".to_string(),
            category: "electronics".to_string(),
            image: "https://img.example/2.png".to_string(),
            rating: Rating {
                rate: 3.1,
                count: 42,
            },
        },
    ]
}

pub(crate) async fn spawn_catalog_server() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let app = Router::new()
        .route("/products", get(|| async { Json(sample_products()) }))
        .route(
            "/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route(
            "/missing-field",
            get(|| async { Json(serde_json::json!([{ "id": 1, "title": "No price" }])) }),
        );

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(format!("http://{addr}"))
}

pub(crate) fn unreachable_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}/products")
}
