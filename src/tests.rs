//! Integration tests for the Modista web gateway.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::backend::{BackendApi, BearerToken, ExportFile, HttpBackend};
use crate::config::Config;
use crate::errors::AppError;
use crate::listing::{CourseQuery, ExportFormat, InscriptionQuery, PaymentFilter};
use crate::models::{
    AuthSession, Course, DepositUpdate, EmailKind, EmailRequest, Inscription, InscriptionCount,
    LoginRequest, NewInscription, NewTurno, Page, PaymentStatus, Preference, PreferenceRequest,
    RegisterRequest, RescheduleRequest, Tariff, Testimonial, Turno, TurnoPatch, WorkshopDetails,
};
use crate::search::SearchCoalescer;
use crate::validation::CourseInput;
use crate::{create_router, AppState};

const ADMIN_TOKEN: &str = "admin.jwt.token";
const LEGACY_SECRET: &str = "legacy-secret";

fn course(id: &str, title: &str, price: f64, presencial: bool) -> Course {
    Course {
        id: id.to_string(),
        title: title.to_string(),
        price,
        short_description: format!("Descripción de {}", title),
        long_description: String::new(),
        image_url: "/images/cursos/molderia.jpg".to_string(),
        category: "Costura".to_string(),
        is_presencial: presencial,
        deeplink: Some(format!("https://cursos.test/{}", id)),
        video_url: None,
        course_paid: None,
    }
}

fn turno(id: &str, course_id: &str, dia: &str, capacity: u32, enrolled: u32) -> Turno {
    Turno {
        id: id.to_string(),
        course_id: course_id.to_string(),
        dia_semana: dia.to_string(),
        fecha: None,
        hora_inicio: "18:00".to_string(),
        hora_fin: "20:00".to_string(),
        cupo_maximo: capacity,
        cupos_inscriptos: enrolled,
        is_blocked: false,
    }
}

fn inscription(id: &str, nombre: &str, course: &Course, turno_id: Option<&str>) -> Inscription {
    Inscription {
        id: id.to_string(),
        nombre: nombre.to_string(),
        apellido: "Gómez".to_string(),
        email: format!("{}@test.com", nombre.to_lowercase()),
        celular: "+5491122223333".to_string(),
        course_id: course.id.clone(),
        course_title: course.title.clone(),
        course_price: Some(course.price),
        turno_id: turno_id.map(str::to_string),
        payment_status: PaymentStatus::Pending,
        deposit_amount: None,
        deposit_date: None,
        is_reserved: false,
        fecha_inscripcion: Some("2026-03-01T10:00:00Z".to_string()),
    }
}

#[derive(Default)]
struct FakeData {
    courses: Vec<Course>,
    turnos: Vec<Turno>,
    inscriptions: Vec<Inscription>,
    emails: Vec<EmailRequest>,
    inscription_calls: usize,
    deposit_calls: usize,
    fail_email: bool,
    fail_listing: bool,
    next_id: u64,
}

/// In-memory stand-in for the course backend.
struct FakeBackend {
    data: Mutex<FakeData>,
}

impl FakeBackend {
    fn seeded() -> Self {
        let free = course("c-free", "Moldería básica", 0.0, false);
        let online = course("c-online", "Corte y confección online", 8000.0, false);
        let taller = course("c-taller", "Taller presencial", 12000.0, true);

        let data = FakeData {
            turnos: vec![
                turno("t-full", "c-taller", "Miércoles", 2, 2),
                turno("t-open", "c-taller", "Lunes", 10, 3),
            ],
            inscriptions: vec![
                inscription("i-ana", "Ana", &taller, Some("t-full")),
                inscription("i-luz", "Luz", &taller, Some("t-full")),
                inscription("i-eva", "Eva", &online, None),
            ],
            courses: vec![free, online, taller],
            next_id: 100,
            ..FakeData::default()
        };
        Self {
            data: Mutex::new(data),
        }
    }

    fn data(&self) -> MutexGuard<'_, FakeData> {
        self.data.lock().unwrap()
    }

    fn not_found(what: &str) -> AppError {
        AppError::Backend {
            status: 404,
            message: format!("{} no encontrado", what),
        }
    }
}

#[async_trait]
impl BackendApi for FakeBackend {
    async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        Ok(self.data().courses.clone())
    }

    async fn list_courses_admin(
        &self,
        _token: &BearerToken,
        query: &CourseQuery,
    ) -> Result<Page<Course>, AppError> {
        let courses = self.data().courses.clone();
        Ok(Page {
            total: courses.len() as u64,
            items: courses,
            page: query.page,
            total_pages: 0,
        })
    }

    async fn create_course(
        &self,
        _token: &BearerToken,
        input: &CourseInput,
    ) -> Result<Course, AppError> {
        let mut data = self.data();
        data.next_id += 1;
        let mut created = course(
            &format!("c-{}", data.next_id),
            &input.title,
            input.price,
            input.is_presencial,
        );
        created.short_description = input.short_description.clone();
        created.image_url = input.image_url.clone();
        data.courses.push(created.clone());
        Ok(created)
    }

    async fn update_course(
        &self,
        _token: &BearerToken,
        id: &str,
        input: &CourseInput,
    ) -> Result<Course, AppError> {
        let mut data = self.data();
        let existing = data
            .courses
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| Self::not_found("Curso"))?;
        existing.title = input.title.clone();
        existing.price = input.price;
        Ok(existing.clone())
    }

    async fn delete_course(&self, _token: &BearerToken, id: &str) -> Result<(), AppError> {
        let mut data = self.data();
        let before = data.courses.len();
        data.courses.retain(|c| c.id != id);
        if data.courses.len() == before {
            return Err(Self::not_found("Curso"));
        }
        Ok(())
    }

    async fn course_paid(&self, title: &str) -> Result<Value, AppError> {
        Ok(json!({ "title": title, "videoUrl": "https://video.test/1" }))
    }

    async fn list_turnos(
        &self,
        course_id: &str,
        _admin: Option<&BearerToken>,
    ) -> Result<Vec<Turno>, AppError> {
        Ok(self
            .data()
            .turnos
            .iter()
            .filter(|t| t.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn create_turno(&self, _token: &BearerToken, new: &NewTurno) -> Result<Turno, AppError> {
        let mut data = self.data();
        data.next_id += 1;
        let mut created = turno(
            &format!("t-{}", data.next_id),
            &new.course_id,
            &new.dia_semana,
            new.cupo_maximo,
            0,
        );
        created.hora_inicio = new.hora_inicio.clone();
        created.hora_fin = new.hora_fin.clone();
        data.turnos.push(created.clone());
        Ok(created)
    }

    async fn update_turno(
        &self,
        _token: &BearerToken,
        id: &str,
        patch: &TurnoPatch,
    ) -> Result<Turno, AppError> {
        let mut data = self.data();
        let existing = data
            .turnos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Self::not_found("Turno"))?;
        if let Some(blocked) = patch.is_blocked {
            existing.is_blocked = blocked;
        }
        Ok(existing.clone())
    }

    async fn delete_turno(&self, _token: &BearerToken, id: &str) -> Result<(), AppError> {
        self.data().turnos.retain(|t| t.id != id);
        Ok(())
    }

    async fn create_inscription(&self, new: &NewInscription) -> Result<Inscription, AppError> {
        let mut data = self.data();
        data.inscription_calls += 1;

        if let Some(turno_id) = &new.turno_id {
            let slot = data
                .turnos
                .iter_mut()
                .find(|t| &t.id == turno_id)
                .ok_or_else(|| Self::not_found("Turno"))?;
            if slot.is_full() {
                return Err(AppError::Backend {
                    status: 409,
                    message: "El turno está completo".to_string(),
                });
            }
            slot.cupos_inscriptos += 1;
        }

        data.next_id += 1;
        let created = Inscription {
            id: format!("i-{}", data.next_id),
            nombre: new.nombre.clone(),
            apellido: new.apellido.clone(),
            email: new.email.clone(),
            celular: new.celular.clone(),
            course_id: new.course_id.clone(),
            course_title: new.course.course_title.clone(),
            course_price: Some(new.course.course_price),
            turno_id: new.turno_id.clone(),
            payment_status: PaymentStatus::Pending,
            deposit_amount: None,
            deposit_date: None,
            is_reserved: false,
            fecha_inscripcion: Some(format!("{}-03-02T09:00:00Z", new.year)),
        };
        data.inscriptions.push(created.clone());
        Ok(created)
    }

    async fn list_inscriptions(
        &self,
        _token: &BearerToken,
        query: &InscriptionQuery,
    ) -> Result<Page<Inscription>, AppError> {
        if self.data().fail_listing {
            return Err(AppError::Backend {
                status: 500,
                message: "Error al listar inscripciones".to_string(),
            });
        }
        let needle = query.search.clone().unwrap_or_default().to_lowercase();
        let items: Vec<Inscription> = self
            .data()
            .inscriptions
            .iter()
            .filter(|i| {
                needle.is_empty()
                    || i.nombre.to_lowercase().contains(&needle)
                    || i.email.to_lowercase().contains(&needle)
            })
            .filter(|i| match query.payment_status {
                PaymentFilter::All => true,
                PaymentFilter::Paid => i.payment_status == PaymentStatus::Paid,
                PaymentFilter::Pending => i.payment_status == PaymentStatus::Pending,
            })
            .cloned()
            .collect();
        Ok(Page {
            total: items.len() as u64,
            items,
            page: query.page,
            total_pages: 0,
        })
    }

    async fn count_inscriptions(&self, _token: &BearerToken) -> Result<InscriptionCount, AppError> {
        Ok(InscriptionCount {
            total: self.data().inscriptions.len() as u64,
        })
    }

    async fn update_payment_status(
        &self,
        _token: &BearerToken,
        id: &str,
        status: PaymentStatus,
    ) -> Result<Inscription, AppError> {
        let mut data = self.data();
        let row = data
            .inscriptions
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| Self::not_found("Inscripción"))?;
        row.payment_status = status;
        Ok(row.clone())
    }

    async fn register_deposit(
        &self,
        _token: &BearerToken,
        id: &str,
        deposit: &DepositUpdate,
    ) -> Result<Inscription, AppError> {
        let mut data = self.data();
        data.deposit_calls += 1;
        let row = data
            .inscriptions
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| Self::not_found("Inscripción"))?;
        row.deposit_amount = Some(deposit.deposit_amount);
        row.deposit_date = Some(deposit.deposit_date.clone());
        Ok(row.clone())
    }

    async fn export_inscriptions(
        &self,
        _token: &BearerToken,
        _query: &InscriptionQuery,
        format: ExportFormat,
    ) -> Result<ExportFile, AppError> {
        let rows: String = self
            .data()
            .inscriptions
            .iter()
            .map(|i| format!("{},{}\n", i.nombre, i.apellido))
            .collect();
        Ok(ExportFile {
            filename: format!("inscripciones-2026.{}", format.extension()),
            content_type: format.content_type().to_string(),
            bytes: format!("nombre,apellido\n{}", rows).into_bytes(),
        })
    }

    async fn workshop_inscriptions(
        &self,
        _token: &BearerToken,
        workshop_id: &str,
    ) -> Result<Vec<Inscription>, AppError> {
        Ok(self
            .data()
            .inscriptions
            .iter()
            .filter(|i| i.course_id == workshop_id)
            .cloned()
            .collect())
    }

    async fn workshop_details(
        &self,
        _token: &BearerToken,
        workshop_id: &str,
    ) -> Result<WorkshopDetails, AppError> {
        let data = self.data();
        Ok(WorkshopDetails {
            course: data.courses.iter().find(|c| c.id == workshop_id).cloned(),
            turnos: data
                .turnos
                .iter()
                .filter(|t| t.course_id == workshop_id)
                .cloned()
                .collect(),
            inscriptions: data
                .inscriptions
                .iter()
                .filter(|i| i.course_id == workshop_id)
                .cloned()
                .collect(),
        })
    }

    async fn reschedule(
        &self,
        _token: &BearerToken,
        inscription_id: &str,
        request: &RescheduleRequest,
    ) -> Result<Inscription, AppError> {
        let mut data = self.data();
        let row = data
            .inscriptions
            .iter_mut()
            .find(|i| i.id == inscription_id)
            .ok_or_else(|| Self::not_found("Inscripción"))?;
        row.turno_id = Some(request.turno_id.clone());
        Ok(row.clone())
    }

    async fn available_turnos(
        &self,
        _token: &BearerToken,
        inscription_id: &str,
    ) -> Result<Vec<Turno>, AppError> {
        let data = self.data();
        let row = data
            .inscriptions
            .iter()
            .find(|i| i.id == inscription_id)
            .ok_or_else(|| Self::not_found("Inscripción"))?;
        Ok(data
            .turnos
            .iter()
            .filter(|t| t.course_id == row.course_id && Some(&t.id) != row.turno_id.as_ref())
            .cloned()
            .collect())
    }

    async fn create_preference(
        &self,
        request: &PreferenceRequest,
    ) -> Result<Preference, AppError> {
        Ok(Preference {
            preference_id: format!("pref-{}", request.course_id),
        })
    }

    async fn payment_data(&self, query: &[(String, String)]) -> Result<Value, AppError> {
        let map: serde_json::Map<String, Value> = query
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        Ok(Value::Object(map))
    }

    async fn send_email(&self, email: &EmailRequest) -> Result<(), AppError> {
        let mut data = self.data();
        if data.fail_email {
            return Err(AppError::Backend {
                status: 500,
                message: "SMTP caído".to_string(),
            });
        }
        data.emails.push(email.clone());
        Ok(())
    }

    async fn testimonials(&self) -> Result<Vec<Testimonial>, AppError> {
        Ok(vec![Testimonial {
            id: "1".to_string(),
            name: "Marta".to_string(),
            description: "Aprendí muchísimo".to_string(),
        }])
    }

    async fn tariffs(&self) -> Result<Vec<Tariff>, AppError> {
        Ok(vec![])
    }

    async fn tariffs_meta(&self) -> Result<Value, AppError> {
        Ok(json!({ "periods": ["2026-01"] }))
    }

    async fn search_tariffs(&self, _query: &[(String, String)]) -> Result<Vec<Tariff>, AppError> {
        Ok(vec![])
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthSession, AppError> {
        if request.password == "correcta-123" {
            Ok(AuthSession {
                token: ADMIN_TOKEN.to_string(),
                user: json!({ "email": request.email }),
            })
        } else {
            Err(AppError::Backend {
                status: 401,
                message: "Credenciales inválidas".to_string(),
            })
        }
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthSession, AppError> {
        Ok(AuthSession {
            token: "new.jwt".to_string(),
            user: json!({ "email": request.email }),
        })
    }
}

fn test_config(admin_secret: Option<&str>) -> Config {
    Config {
        backend_url: "http://backend.invalid".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        log_level: "warn".to_string(),
        admin_secret: admin_secret.map(str::to_string),
        payment_public_key: Some("TEST-public-key".to_string()),
        analytics_id: None,
        search_debounce: Duration::from_millis(80),
        request_timeout: Duration::from_secs(5),
    }
}

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    backend: Arc<FakeBackend>,
    search: Arc<SearchCoalescer>,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_config(test_config(Some(LEGACY_SECRET))).await
    }

    async fn with_config(config: Config) -> Self {
        let backend = Arc::new(FakeBackend::seeded());
        let state = AppState::new(backend.clone(), config);
        let search = state.search.clone();
        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            backend,
            search,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn admin(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .bearer_auth(ADMIN_TOKEN)
    }
}

fn juan_perez(course_id: &str) -> Value {
    json!({
        "courseId": course_id,
        "nombre": "Juan",
        "apellido": "Pérez",
        "email": "juan@test.com",
        "celular": "+5491122223333"
    })
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_catalog_cards() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/catalog"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    let cards = body["data"].as_array().unwrap();
    assert_eq!(cards.len(), 3);

    assert_eq!(cards[0]["priceLabel"], "Gratis");
    assert_eq!(cards[0]["entry"], "free");
    assert_eq!(cards[1]["priceLabel"], "$ 8.000");
    assert_eq!(cards[1]["entry"], "pay");
    assert_eq!(cards[2]["priceLabel"], "$ 12.000");
    assert_eq!(cards[2]["entry"], "enroll");
}

#[tokio::test]
async fn test_course_detail_not_found() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/catalog/missing"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_free_course_inscription() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/inscriptions"))
        .json(&juan_perez("c-free"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("Revisa tu correo"));
    assert_eq!(body["data"]["inscription"]["courseTitle"], "Moldería básica");
    assert_eq!(body["data"]["form"]["nombre"], "");
    assert_eq!(body["data"]["form"]["email"], "");

    let data = fixture.backend.data();
    assert_eq!(data.inscription_calls, 1);
    let stored = data.inscriptions.last().unwrap();
    assert_eq!(stored.nombre, "Juan");
    assert_eq!(stored.course_price, Some(0.0));
    assert!(stored.turno_id.is_none());

    assert_eq!(data.emails.len(), 1);
    assert_eq!(data.emails[0].to, "juan@test.com");
    assert_eq!(data.emails[0].kind, EmailKind::InscriptionConfirmation);
    assert_eq!(
        data.emails[0].deeplink.as_deref(),
        Some("https://cursos.test/c-free")
    );
}

#[tokio::test]
async fn test_inscription_survives_email_failure() {
    let fixture = TestFixture::new().await;
    fixture.backend.data().fail_email = true;

    let resp = fixture
        .client
        .post(fixture.url("/api/inscriptions"))
        .json(&juan_perez("c-free"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(fixture.backend.data().inscription_calls, 1);
}

#[tokio::test]
async fn test_invalid_form_never_reaches_backend() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/inscriptions"))
        .json(&json!({
            "courseId": "c-free",
            "nombre": "",
            "apellido": "Pérez",
            "email": "juan@",
            "celular": "123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let fields = &body["error"]["details"]["fields"];
    assert!(fields["nombre"].is_string());
    assert!(fields["email"].is_string());
    assert!(fields["celular"].is_string());
    assert!(fields["apellido"].is_null());

    assert_eq!(fixture.backend.data().inscription_calls, 0);
}

#[tokio::test]
async fn test_presencial_inscription_needs_open_turno() {
    let fixture = TestFixture::new().await;

    // No slot picked
    let resp = fixture
        .client
        .post(fixture.url("/api/inscriptions"))
        .json(&juan_perez("c-taller"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);

    // Full slot
    let mut body = juan_perez("c-taller");
    body["turnoId"] = json!("t-full");
    let resp = fixture
        .client
        .post(fixture.url("/api/inscriptions"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);
    let err: Value = resp.json().await.unwrap();
    assert!(err["error"]["details"]["fields"]["turnoId"].is_string());
    assert_eq!(fixture.backend.data().inscription_calls, 0);

    // Open slot
    body["turnoId"] = json!("t-open");
    let resp = fixture
        .client
        .post(fixture.url("/api/inscriptions"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let ok: Value = resp.json().await.unwrap();
    assert_eq!(ok["data"]["inscription"]["turnoId"], "t-open");

    let data = fixture.backend.data();
    let slot = data.turnos.iter().find(|t| t.id == "t-open").unwrap();
    assert_eq!(slot.cupos_inscriptos, 4);
}

#[tokio::test]
async fn test_turno_picker_marks_full_slots() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/courses/c-taller/turnos?selected=t-full"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["hasAvailability"], true);
    let options = body["data"]["options"].as_array().unwrap();

    // Lunes sorts before Miércoles
    assert_eq!(options[0]["id"], "t-open");
    assert_eq!(options[0]["label"], "7 lugares");
    assert_eq!(options[1]["id"], "t-full");
    assert_eq!(options[1]["selectable"], false);
    assert_eq!(options[1]["selected"], false);
    assert_eq!(options[1]["label"], "Completo");
}

#[tokio::test]
async fn test_checkout_for_paid_course_only() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/payment/preference"))
        .json(&json!({ "courseId": "c-free" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = fixture
        .client
        .post(fixture.url("/api/payment/preference"))
        .json(&json!({ "courseId": "c-online", "payerEmail": "eva@test.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["preferenceId"], "pref-c-online");
    assert_eq!(body["data"]["publicKey"], "TEST-public-key");
}

#[tokio::test]
async fn test_site_config() {
    let fixture = TestFixture::new().await;

    let body: Value = fixture
        .client
        .get(fixture.url("/api/site/config"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["paymentsEnabled"], true);
    assert_eq!(body["data"]["searchDebounceMs"], 80);
    assert!(body["data"].get("analyticsId").is_none());
}

#[tokio::test]
async fn test_passthrough_endpoints() {
    let fixture = TestFixture::new().await;

    let body: Value = fixture
        .client
        .get(fixture.url("/api/catalog/paid/Corte%20y%20confecci%C3%B3n%20online"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["title"], "Corte y confección online");

    let body: Value = fixture
        .client
        .get(fixture.url("/api/payment/data?payment_id=123&status=approved"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["payment_id"], "123");
    assert_eq!(body["data"]["status"], "approved");

    let body: Value = fixture
        .client
        .get(fixture.url("/api/testimonials"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"][0]["name"], "Marta");
}

#[tokio::test]
async fn test_login_forwards_backend_message() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/auth/login"))
        .json(&json!({ "email": "admin@test.com", "password": "incorrecta" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["message"], "Credenciales inválidas");

    let resp = fixture
        .client
        .post(fixture.url("/api/auth/login"))
        .json(&json!({ "email": "admin@test.com", "password": "correcta-123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["token"], ADMIN_TOKEN);
}

#[tokio::test]
async fn test_admin_requires_bearer() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/admin/inscriptions"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_inscription_table_sorting_headers() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .admin(
            reqwest::Method::GET,
            "/api/admin/inscriptions?sortBy=nombre&sortOrder=asc&limit=2",
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    let table = &body["data"];
    assert_eq!(table["total"], 3);
    assert_eq!(table["totalPages"], 2);
    assert_eq!(table["sort"]["column"], "nombre");
    assert_eq!(table["sort"]["order"], "asc");

    let headers = table["headers"].as_array().unwrap();
    let nombre = headers.iter().find(|h| h["column"] == "nombre").unwrap();
    assert_eq!(nombre["active"], true);
    assert_eq!(nombre["next"]["order"], "desc");
    let email = headers.iter().find(|h| h["column"] == "email").unwrap();
    assert_eq!(email["active"], false);
    assert_eq!(email["next"]["order"], "asc");
}

#[tokio::test]
async fn test_live_search_drops_superseded_keystroke() {
    let fixture = TestFixture::new().await;

    let first = fixture
        .admin(reqwest::Method::GET, "/api/admin/inscriptions/live-search?search=a")
        .send();
    let second = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        fixture
            .admin(reqwest::Method::GET, "/api/admin/inscriptions/live-search?q=ana")
            .send()
            .await
    };

    let (first, second) = tokio::join!(first, second);
    let (first, second) = (first.unwrap(), second.unwrap());
    assert_eq!(first.status(), 204);
    assert_eq!(second.status(), 200);

    let body: Value = second.json().await.unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["nombre"], "Ana");
    assert!(body["data"]["ticket"].as_u64().is_some());
}

#[tokio::test]
async fn test_failed_live_search_releases_session() {
    let fixture = TestFixture::new().await;
    fixture.backend.data().fail_listing = true;

    let resp = fixture
        .admin(reqwest::Method::GET, "/api/admin/inscriptions/live-search?q=ana")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["message"], "Error al listar inscripciones");
    assert_eq!(fixture.search.tracked_sessions().await, 0);
}

#[tokio::test]
async fn test_deposit_rejected_before_backend() {
    let fixture = TestFixture::new().await;

    for amount in [json!(15000), json!(12000), json!(0), json!(-5)] {
        let resp = fixture
            .admin(reqwest::Method::PATCH, "/api/admin/inscriptions/i-ana/deposit")
            .json(&json!({ "amount": amount, "coursePrice": 12000 }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 422, "amount {}", amount);
    }
    assert_eq!(fixture.backend.data().deposit_calls, 0);

    for price in [json!("NaN"), json!(0)] {
        let resp = fixture
            .admin(reqwest::Method::PATCH, "/api/admin/inscriptions/i-ana/deposit")
            .json(&json!({ "amount": 50000, "coursePrice": price }))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_client_error(), "course price {}", price);
    }
    assert_eq!(fixture.backend.data().deposit_calls, 0);

    let resp = fixture
        .admin(reqwest::Method::PATCH, "/api/admin/inscriptions/i-ana/deposit")
        .json(&json!({ "amount": "5000", "coursePrice": 12000 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["depositAmount"], 5000.0);
    assert_eq!(fixture.backend.data().deposit_calls, 1);
}

#[tokio::test]
async fn test_marking_paid_sends_payment_email() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .admin(
            reqwest::Method::PATCH,
            "/api/admin/inscriptions/i-eva/payment-status",
        )
        .json(&json!({ "paymentStatus": "paid" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["inscription"]["paymentStatus"], "paid");
    assert_eq!(body["data"]["confirmationEmailSent"], true);

    let resp = fixture
        .admin(
            reqwest::Method::PATCH,
            "/api/admin/inscriptions/i-eva/payment-status",
        )
        .json(&json!({ "status": "pending" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["confirmationEmailSent"], false);

    let resp = fixture
        .admin(
            reqwest::Method::PATCH,
            "/api/admin/inscriptions/i-eva/payment-status",
        )
        .json(&json!({ "paymentStatus": "paid", "previousStatus": "paid" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["confirmationEmailSent"], false);

    let data = fixture.backend.data();
    assert_eq!(data.emails.len(), 1);
    assert_eq!(data.emails[0].kind, EmailKind::PaymentConfirmation);
    assert_eq!(data.emails[0].to, "eva@test.com");
}

#[tokio::test]
async fn test_export_download() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .admin(
            reqwest::Method::GET,
            "/api/admin/inscriptions/export?format=csv&paymentStatus=pending",
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let disposition = resp
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("inscripciones-2026.csv"));
    assert!(resp
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/csv"));

    let text = resp.text().await.unwrap();
    assert!(text.starts_with("nombre,apellido\n"));
}

#[tokio::test]
async fn test_course_delete_needs_confirmation() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .admin(reqwest::Method::DELETE, "/api/admin/courses/c-online")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 428);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "CONFIRMATION_REQUIRED");
    assert_eq!(fixture.backend.data().courses.len(), 3);

    let resp = fixture
        .admin(
            reqwest::Method::DELETE,
            "/api/admin/courses/c-online?confirm=true",
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(fixture.backend.data().courses.len(), 2);
}

#[tokio::test]
async fn test_create_course_validation() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .admin(reqwest::Method::POST, "/api/admin/courses")
        .json(&json!({
            "title": "<b>Bordado</b> a mano",
            "shortDescription": "Puntadas básicas y avanzadas",
            "longDescription": "Un recorrido completo por las puntadas del bordado tradicional a mano.",
            "imageUrl": "/images/cursos/bordado.jpg",
            "category": "Bordado",
            "price": 1000000
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"]["details"]["fields"]["price"].is_string());

    let resp = fixture
        .admin(reqwest::Method::POST, "/api/admin/courses")
        .json(&json!({
            "title": "<b>Bordado</b> a mano",
            "shortDescription": "Puntadas básicas y avanzadas",
            "longDescription": "Un recorrido completo por las puntadas del bordado tradicional a mano.",
            "imageUrl": "/images/cursos/bordado.jpg",
            "category": "Bordado",
            "price": 999999
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Bordado a mano");
}

#[tokio::test]
async fn test_create_course_rejects_non_numeric_price() {
    let fixture = TestFixture::new().await;

    for price in ["NaN", "inf"] {
        let resp = fixture
            .admin(reqwest::Method::POST, "/api/admin/courses")
            .json(&json!({
                "title": "Bordado a mano",
                "shortDescription": "Puntadas básicas y avanzadas",
                "longDescription": "Un recorrido completo por las puntadas del bordado tradicional a mano.",
                "imageUrl": "/images/cursos/bordado.jpg",
                "category": "Bordado",
                "price": price
            }))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_client_error(), "price {}", price);
    }
    assert_eq!(fixture.backend.data().courses.len(), 3);
}

#[tokio::test]
async fn test_turno_writes_refetch_schedule() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .admin(reqwest::Method::POST, "/api/admin/turnos")
        .json(&json!({
            "courseId": "c-taller",
            "diaSemana": "viernes",
            "horaInicio": "20:00",
            "horaFin": "18:00",
            "cupoMaximo": 8
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);

    let resp = fixture
        .admin(reqwest::Method::POST, "/api/admin/turnos")
        .json(&json!({
            "courseId": "c-taller",
            "diaSemana": "viernes",
            "horaInicio": "10:00",
            "horaFin": "12:30",
            "cupoMaximo": 8
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let slots = body["data"]["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 3);
    assert_eq!(slots[2]["diaSemana"], "Viernes");
    assert_eq!(body["data"]["totalCapacity"], 20);

    let full = slots.iter().find(|s| s["id"] == "t-full").unwrap();
    assert_eq!(full["isFull"], true);
    assert_eq!(full["capacityLabel"], "2/2");
    assert_eq!(full["color"], "red");

    let resp = fixture
        .admin(
            reqwest::Method::PATCH,
            "/api/admin/turnos/t-open/block?courseId=c-taller",
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let open = body["data"]["slots"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["id"] == "t-open")
        .unwrap()
        .clone();
    assert_eq!(open["isBlocked"], true);

    // Repeating an explicit target keeps the slot blocked.
    for _ in 0..2 {
        let resp = fixture
            .admin(
                reqwest::Method::PATCH,
                "/api/admin/turnos/t-open/block?courseId=c-taller",
            )
            .json(&json!({ "isBlocked": true }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }
    let blocked = fixture
        .backend
        .data()
        .turnos
        .iter()
        .find(|t| t.id == "t-open")
        .map(|t| t.is_blocked);
    assert_eq!(blocked, Some(true));

    let resp = fixture
        .admin(
            reqwest::Method::DELETE,
            "/api/admin/turnos/t-open?courseId=c-taller",
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 428);

    let resp = fixture
        .admin(
            reqwest::Method::DELETE,
            "/api/admin/turnos/t-open?courseId=c-taller&confirm=true",
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["slots"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_workshop_roster_and_reschedule() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .admin(reqwest::Method::GET, "/api/admin/workshops/c-taller/details")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["courseTitle"], "Taller presencial");
    let slots = body["data"]["slots"].as_array().unwrap();
    let full = slots.iter().find(|s| s["slot"]["id"] == "t-full").unwrap();
    assert_eq!(full["students"].as_array().unwrap().len(), 2);

    let resp = fixture
        .admin(
            reqwest::Method::GET,
            "/api/admin/workshop-inscriptions/i-ana/available-turnos",
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let resp = fixture
        .admin(
            reqwest::Method::PUT,
            "/api/admin/workshop-inscriptions/i-ana/schedule",
        )
        .json(&json!({ "turnoId": "t-missing" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);

    let resp = fixture
        .admin(
            reqwest::Method::PUT,
            "/api/admin/workshop-inscriptions/i-ana/schedule",
        )
        .json(&json!({ "turnoId": "t-open" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["turnoId"], "t-open");
}

#[tokio::test]
async fn test_legacy_view_needs_token_and_secret() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url(&format!("/legacy/inscriptions?secret={}", LEGACY_SECRET)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = fixture
        .admin(reqwest::Method::GET, "/legacy/inscriptions?secret=wrong")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = fixture
        .admin(
            reqwest::Method::GET,
            &format!("/legacy/inscriptions?secret={}", LEGACY_SECRET),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total"], 3);
}

#[tokio::test]
async fn test_legacy_view_disabled_without_secret() {
    let fixture = TestFixture::with_config(test_config(None)).await;

    let resp = fixture
        .admin(reqwest::Method::GET, "/legacy/inscriptions?secret=anything")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

// HttpBackend against a stub backend

mod http_backend {
    use super::*;
    use axum::{
        extract::Path,
        http::{header, HeaderMap, StatusCode},
        response::IntoResponse,
        routing::{get, post},
        Json, Router,
    };

    async fn stub_courses() -> Json<Value> {
        Json(json!([
            { "_id": "c1", "title": "Moldería", "price": "0" },
            { "_id": 2, "title": "Taller", "price": 12000, "isPresencial": true }
        ]))
    }

    async fn stub_course_paid(Path(title): Path<String>) -> Json<Value> {
        Json(json!({ "title": title }))
    }

    async fn stub_full_turno() -> impl IntoResponse {
        (
            StatusCode::CONFLICT,
            Json(json!({ "message": "El turno está completo", "error": "Conflict" })),
        )
    }

    async fn stub_count(headers: HeaderMap) -> impl IntoResponse {
        match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
            Some("Bearer stub.jwt") => (StatusCode::OK, Json(json!({ "count": 7 }))),
            _ => (StatusCode::UNAUTHORIZED, Json(json!({ "error": "No autorizado" }))),
        }
    }

    async fn stub_export() -> impl IntoResponse {
        (
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"inscripciones-marzo.csv\"",
                ),
            ],
            "nombre,apellido\n",
        )
    }

    async fn stub_backend() -> HttpBackend {
        let app = Router::new()
            .route("/api/courses", get(stub_courses))
            .route("/api/courses/course-paid/{title}", get(stub_course_paid))
            .route("/api/inscriptions", post(stub_full_turno))
            .route("/api/inscriptions/count", get(stub_count))
            .route("/api/inscriptions/export", get(stub_export));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        HttpBackend::new(&format!("http://{}/", addr), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_lenient_course_decoding() {
        let backend = stub_backend().await;
        assert!(backend.base_url().starts_with("http://127.0.0.1:"));

        let courses = backend.list_courses().await.unwrap();
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[1].id, "2");
        assert!(courses[0].is_free());
        assert_eq!(courses[1].price, 12000.0);
    }

    #[tokio::test]
    async fn test_path_segments_are_encoded() {
        let backend = stub_backend().await;

        let paid = backend
            .course_paid("Corte y confección/avanzado")
            .await
            .unwrap();
        assert_eq!(paid["title"], "Corte y confección/avanzado");
    }

    #[tokio::test]
    async fn test_error_message_is_forwarded() {
        let backend = stub_backend().await;
        let courses = backend.list_courses().await.unwrap();

        let new = NewInscription {
            nombre: "Juan".into(),
            apellido: "Pérez".into(),
            email: "juan@test.com".into(),
            celular: "+5491122223333".into(),
            course_id: courses[1].id.clone(),
            turno_id: Some("t1".into()),
            course: courses[1].snapshot(),
            year: 2026,
        };
        match backend.create_inscription(&new).await {
            Err(AppError::Backend { status, message }) => {
                assert_eq!(status, 409);
                assert_eq!(message, "El turno está completo");
            }
            other => panic!("unexpected result: {:?}", other.map(|i| i.id)),
        }
    }

    #[tokio::test]
    async fn test_bearer_is_forwarded() {
        let backend = stub_backend().await;

        let count = backend
            .count_inscriptions(&BearerToken::new("stub.jwt"))
            .await
            .unwrap();
        assert_eq!(count.total, 7);

        let err = backend
            .count_inscriptions(&BearerToken::new("other"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.message(), "No autorizado");
    }

    #[tokio::test]
    async fn test_export_filename_from_disposition() {
        let backend = stub_backend().await;

        let file = backend
            .export_inscriptions(
                &BearerToken::new("stub.jwt"),
                &InscriptionQuery::default(),
                ExportFormat::Csv,
            )
            .await
            .unwrap();
        assert_eq!(file.filename, "inscripciones-marzo.csv");
        assert_eq!(file.content_type, "text/csv");
        assert_eq!(file.bytes, b"nombre,apellido\n");
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let backend = HttpBackend::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let err = backend.list_courses().await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }
}
