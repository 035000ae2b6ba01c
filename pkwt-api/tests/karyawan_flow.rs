use chrono::{Duration, Local};
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use rocket::tokio;

use pkwt_api::DbConn;
use pkwt_api::models::{NewUser, STATUS_NONAKTIF, TINDAK_LANJUT_TIDAK_DIPERPANJANG};
use pkwt_api::orm::karyawan::{count_karyawan, get_karyawan, insert_karyawan, update_tindak_lanjut};
use pkwt_api::orm::login::hash_password;
use pkwt_api::orm::testing::{contoh_karyawan_input, test_rocket};
use pkwt_api::orm::user::insert_user;

async fn logged_in_client() -> Client {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket");
    let db = DbConn::get_one(client.rocket())
        .await
        .expect("database connection");
    let hash = hash_password("rahasia123");
    db.run(move |conn| {
        insert_user(
            conn,
            NewUser {
                username: "admin.hr".to_string(),
                password_hash: hash,
            },
        )
    })
    .await
    .expect("seed user");

    let response = client
        .post("/login")
        .header(ContentType::Form)
        .body("username=admin.hr&password=rahasia123")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);
    drop(response);
    client
}

fn form_karyawan(nama: &str, nup: &str, nik: &str) -> String {
    format!(
        "nama={nama}&jenis_kelamin=Laki-laki&nup={nup}&tempat_lahir=Surabaya\
         &tanggal_lahir=1990-05-01&nik={nik}&alamat=&no_hp=&jabatan=Surveyor\
         &unit_kerja=Cabang+Surabaya&email=&tanggal_mulai=2024-01-01\
         &tanggal_akhir_kontrak=&gaji_honorarium=3000000&tunjangan_tetap="
    )
}

#[tokio::test]
async fn test_add_view_and_duplicate_karyawan() {
    let client = logged_in_client().await;

    let response = client
        .post("/karyawan/tambah")
        .header(ContentType::Form)
        .body(form_karyawan("Budi+Santoso", "K-001", "111"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);

    let body = client
        .get("/dashboard")
        .dispatch()
        .await
        .into_string()
        .await
        .expect("body");
    assert!(body.contains("Budi Santoso"));
    assert!(body.contains("3.000.000"));

    // Same NUP again: rejected, count stays at one.
    client
        .post("/karyawan/tambah")
        .header(ContentType::Form)
        .body(form_karyawan("Siti+Aminah", "K-001", "222"))
        .dispatch()
        .await;

    let db = DbConn::get_one(client.rocket()).await.expect("db");
    let total = db.run(count_karyawan).await.expect("count");
    assert_eq!(total, 1);

    let response = client.get("/karyawan/detail/1").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().await.expect("body");
    assert!(body.contains("Budi Santoso"));
}

#[tokio::test]
async fn test_detail_of_missing_karyawan_redirects() {
    let client = logged_in_client().await;
    let response = client.get("/karyawan/detail/999").dispatch().await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(response.headers().get_one("Location"), Some("/dashboard"));
}

#[tokio::test]
async fn test_dashboard_runs_status_sweep() {
    let client = logged_in_client().await;
    let db = DbConn::get_one(client.rocket()).await.expect("db");

    let today = Local::now().date_naive();
    let id = db
        .run(move |conn| {
            let mut input = contoh_karyawan_input("Budi", "K-001", "111");
            input.tanggal_akhir_kontrak = Some(today - Duration::days(5));
            let k = insert_karyawan(conn, input)?;
            update_tindak_lanjut(conn, k.id, TINDAK_LANJUT_TIDAK_DIPERPANJANG)
                .map_err(pkwt_api::orm::karyawan::RegistryError::from)?;
            Ok::<_, pkwt_api::orm::karyawan::RegistryError>(k.id)
        })
        .await
        .expect("seed karyawan");

    assert_eq!(
        client.get("/dashboard").dispatch().await.status(),
        Status::Ok
    );

    let status = db
        .run(move |conn| get_karyawan(conn, id))
        .await
        .expect("fetch")
        .expect("exists")
        .status;
    assert_eq!(status, STATUS_NONAKTIF);
}

#[tokio::test]
async fn test_update_tindak_lanjut_rejects_unknown_value() {
    let client = logged_in_client().await;
    let db = DbConn::get_one(client.rocket()).await.expect("db");
    let id = db
        .run(|conn| insert_karyawan(conn, contoh_karyawan_input("Budi", "K-001", "111")))
        .await
        .expect("seed")
        .id;

    client
        .post(format!("/karyawan/update_tindak_lanjut/{id}"))
        .header(ContentType::Form)
        .body("tindak_lanjut=Status+Karangan")
        .dispatch()
        .await;

    let tindak_lanjut = db
        .run(move |conn| get_karyawan(conn, id))
        .await
        .expect("fetch")
        .expect("exists")
        .tindak_lanjut_kontrak;
    assert_eq!(tindak_lanjut, "Tidak perlu");
}

#[tokio::test]
async fn test_hapus_karyawan_removes_record() {
    let client = logged_in_client().await;
    let db = DbConn::get_one(client.rocket()).await.expect("db");
    let id = db
        .run(|conn| insert_karyawan(conn, contoh_karyawan_input("Budi", "K-001", "111")))
        .await
        .expect("seed")
        .id;

    let response = client
        .post(format!("/karyawan/hapus/{id}"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);

    let gone = db
        .run(move |conn| get_karyawan(conn, id))
        .await
        .expect("fetch");
    assert!(gone.is_none());
}

#[tokio::test]
async fn test_download_template_is_xlsx() {
    let client = logged_in_client().await;
    let response = client.get("/karyawan/download_template").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert!(
        response
            .headers()
            .get_one("Content-Disposition")
            .is_some_and(|v| v.contains("template_import_karyawan.xlsx"))
    );
    let body = response.into_bytes().await.expect("body");
    assert_eq!(&body[..2], b"PK");
}
