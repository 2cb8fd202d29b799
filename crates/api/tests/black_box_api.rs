use std::sync::Arc;
use std::time::Duration;

use axum::{Json, Router, routing::get};
use reqwest::StatusCode;
use serde_json::{Value, json};

use nexium_api::app::{AppServices, build_app};
use nexium_audit::{AuditStorage, FileAuditStorage};
use nexium_geocoding::{AddressResolver, GeocoderConfig};
use nexium_infra::store::{InMemoryRecordStore, RecordStore};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(services: AppServices) -> Self {
        // Same router as prod, bound to an ephemeral port.
        Self::serve(build_app(services)).await
    }

    async fn serve(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Stand-in for the Nominatim search endpoint.
async fn spawn_geocoder_stub() -> TestServer {
    let app = Router::new().route(
        "/search",
        get(|| async {
            Json(json!([{
                "lat": "-23.5614",
                "lon": "-46.6559",
                "display_name": "Avenida Paulista, São Paulo, Brasil"
            }]))
        }),
    );
    TestServer::serve(app).await
}

fn geocoder_for(stub: &TestServer) -> AddressResolver {
    AddressResolver::new(GeocoderConfig {
        endpoint: stub.url("/search"),
        timeout: Duration::from_secs(5),
        ..GeocoderConfig::default()
    })
    .unwrap()
}

async fn register_material(
    client: &reqwest::Client,
    server: &TestServer,
    name: &str,
    quantity: f64,
) -> Value {
    let res = client
        .post(server.url("/materiais"))
        .header("X-Actor", "almoxarife.paulo")
        .json(&json!({ "name": name, "unit": "saco", "initial_quantity": quantity }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

const NFE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<nfeProc xmlns="http://www.portalfiscal.inf.br/nfe" versao="4.00">
  <NFe>
    <infNFe Id="NFe35240612345678000190550010000012341000012345" versao="4.00">
      <ide><nNF>1234</nNF></ide>
      <emit><CNPJ>12345678000190</CNPJ><xNome>Depósito Central de Materiais</xNome></emit>
      <det nItem="1"><prod><cProd>CIM50</cProd><xProd>Cimento CP-II 50kg</xProd><qCom>30.0000</qCom><uCom>SC</uCom><vUnCom>32.90</vUnCom></prod></det>
      <det nItem="2"><prod><cProd>ARE01</cProd><xProd>Areia média</xProd><qCom>4.5000</qCom><uCom>M3</uCom><vUnCom>120.00</vUnCom></prod></det>
    </infNFe>
  </NFe>
</nfeProc>"#;

#[tokio::test]
async fn health_is_ok() {
    let server = TestServer::spawn(AppServices::in_memory(None)).await;
    let res = reqwest::get(server.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn withdrawal_past_zero_clamps_and_notifies() {
    let server = TestServer::spawn(AppServices::in_memory(None)).await;
    let client = reqwest::Client::new();
    let material = register_material(&client, &server, "Cimento CP-II", 5.0).await;
    let id = material["id"].as_str().unwrap();

    let res = client
        .post(server.url(&format!("/materiais/{id}/movimentacoes")))
        .header("X-Actor", "mestre.jose")
        .json(&json!({ "quantity": -8.0, "reason": "concretagem bloco B" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let applied: Value = res.json().await.unwrap();
    assert_eq!(applied["material"]["quantidade"], 0.0);
    assert_eq!(applied["movement"]["quantidade"], -8.0);
    assert_eq!(applied["movement"]["tipo"], "saida");
    assert_eq!(applied["movement"]["usuario"], "mestre.jose");
    assert_eq!(applied["notification"]["prioridade"], "critical");

    let notifications: Value = client
        .get(server.url("/notificacoes?unread_only=true"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(notifications.as_array().unwrap().len(), 1);

    let history: Value = client
        .get(server.url(&format!("/materiais/{id}/movimentacoes")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.as_array().unwrap().len(), 1);

    let audit: Value = client.get(server.url("/auditoria")).send().await.unwrap().json().await.unwrap();
    assert_eq!(audit[0]["action"], "stock_movement");
    assert_eq!(audit[0]["actor"], "mestre.jose");
    assert_eq!(audit[1]["action"], "create");
    assert_eq!(audit[1]["actor"], "almoxarife.paulo");
}

#[tokio::test]
async fn marking_a_notification_read_hides_it_from_unread() {
    let server = TestServer::spawn(AppServices::in_memory(None)).await;
    let client = reqwest::Client::new();
    let material = register_material(&client, &server, "Brita 1", 12.0).await;
    let id = material["id"].as_str().unwrap();

    let applied: Value = client
        .post(server.url(&format!("/materiais/{id}/movimentacoes")))
        .json(&json!({ "quantity": -10.0 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(applied["material"]["quantidade"], 2.0);
    assert_eq!(applied["notification"]["prioridade"], "high");
    // No X-Actor header: the system acts.
    assert_eq!(applied["movement"]["usuario"], "sistema");

    let nid = applied["notification"]["id"].as_str().unwrap();
    let res = client
        .post(server.url(&format!("/notificacoes/{nid}/read")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let unread: Value = client
        .get(server.url("/notificacoes?unread_only=true"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(unread.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn errors_map_to_status_codes() {
    let server = TestServer::spawn(AppServices::in_memory(None)).await;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/materiais/not-a-uuid")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");

    let res = client
        .get(server.url(&format!("/materiais/{}", uuid::Uuid::now_v7())))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");

    let res = client
        .post(server.url("/materiais"))
        .json(&json!({ "name": "  ", "unit": "kg" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    let res = client
        .post(server.url("/nfe/parse"))
        .body("<nfeProc><NFe>")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "parse_error");
}

#[tokio::test]
async fn obra_lifecycle_with_tasks() {
    let server = TestServer::spawn(AppServices::in_memory(None)).await;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/obras"))
        .header("X-Actor", "eng.carla")
        .json(&json!({ "name": "Residencial Ipê", "address": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let obra: Value = res.json().await.unwrap();
    let obra_id = obra["id"].as_str().unwrap();
    assert_eq!(obra["status"], "planejamento");

    let task: Value = client
        .post(server.url(&format!("/obras/{obra_id}/tarefas")))
        .json(&json!({ "title": "Locação da obra", "priority": "high" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let task_id = task["id"].as_str().unwrap();

    let moved: Value = client
        .post(server.url(&format!("/tarefas/{task_id}/status")))
        .json(&json!({ "status": "in_progress" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(moved["status"], "in_progress");

    let board: Value = client
        .get(server.url(&format!("/obras/{obra_id}/quadro")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(board["in_progress"].as_array().unwrap().len(), 1);

    let updated: Value = client
        .patch(server.url(&format!("/obras/{obra_id}")))
        .json(&json!({ "status": "em_andamento", "progress": 35 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["progresso"], 35);

    let res = client
        .patch(server.url(&format!("/obras/{obra_id}")))
        .json(&json!({ "progress": 140 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .delete(server.url(&format!("/obras/{obra_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(server.url(&format!("/obras/{obra_id}/tarefas")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn new_obra_is_geocoded_from_its_address() {
    let stub = spawn_geocoder_stub().await;
    let server = TestServer::spawn(AppServices::in_memory(Some(geocoder_for(&stub)))).await;
    let client = reqwest::Client::new();

    let obra: Value = client
        .post(server.url("/obras"))
        .json(&json!({ "name": "Torre Paulista", "address": "Avenida Paulista, 1000" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(obra["latitude"], -23.5614);
    assert_eq!(obra["longitude"], -46.6559);

    let res = client
        .post(server.url("/geocode"))
        .json(&json!({ "address": "Avenida Paulista, 1000" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["result"]["display_name"], "Avenida Paulista, São Paulo, Brasil");

    let res = client
        .post(server.url("/geocode"))
        .json(&json!({ "address": "12-4" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn nfe_import_books_stock_and_persists_audit_file() {
    let dir = tempfile::tempdir().unwrap();
    let audit_storage: Arc<dyn AuditStorage> = Arc::new(FileAuditStorage::new(dir.path()));
    let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
    let server = TestServer::spawn(AppServices::new(store, audit_storage, None)).await;
    let client = reqwest::Client::new();

    let parsed: Value = client
        .post(server.url("/nfe/parse"))
        .body(NFE_XML)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(parsed["invoice"]["key"], "35240612345678000190550010000012341000012345");
    assert_eq!(parsed["invoice"]["items"].as_array().unwrap().len(), 2);

    let res = client
        .post(server.url("/nfe/import"))
        .header("X-Actor", "compras.lia")
        .body(NFE_XML)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let summary: Value = res.json().await.unwrap();
    assert_eq!(summary["registered"].as_array().unwrap().len(), 2);
    assert_eq!(summary["applied"].as_array().unwrap().len(), 2);

    let materials: Value = client.get(server.url("/materiais")).send().await.unwrap().json().await.unwrap();
    let quantities: Vec<f64> = materials
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["quantidade"].as_f64().unwrap())
        .collect();
    assert_eq!(quantities, vec![30.0, 4.5]);

    let on_disk = FileAuditStorage::new(dir.path()).load().unwrap();
    assert_eq!(on_disk[0].action, nexium_audit::AuditAction::Import);
    assert_eq!(on_disk[0].actor.as_str(), "compras.lia");
}
