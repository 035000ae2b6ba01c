//! Automatic status transitions over employee contract dates.
//!
//! The sweep runs at the start of every dashboard render; there is no
//! scheduler, request traffic is the trigger. Both updates are predicated on
//! the source state, so re-running the sweep over already-updated rows
//! changes nothing.

use chrono::{Duration, NaiveDate};
use diesel::prelude::*;

use crate::models::{
    STATUS_AKTIF, STATUS_NONAKTIF, TINDAK_LANJUT_BELUM, TINDAK_LANJUT_TIDAK_DIPERPANJANG,
    TINDAK_LANJUT_TIDAK_PERLU,
};

/// How far ahead (in days) an expiring contract is flagged for follow-up.
pub const HORIZON_TINDAK_LANJUT_HARI: i64 = 90;

/// Outcome of one sweep: rows deactivated and rows flagged for follow-up.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct HasilSweep {
    pub dinonaktifkan: usize,
    pub ditandai_tindak_lanjut: usize,
}

/// Runs both status transitions in one transaction:
///
/// 1. Active employees marked "Tidak diperpanjang" whose contract ended
///    strictly before `today` become Nonaktif.
/// 2. Employees with an end date no more than 90 days away whose follow-up
///    is still "Tidak perlu" are flagged "Belum ditindaklanjuti".
///
/// Either both updates commit or neither does.
pub fn jalankan_sweep(
    conn: &mut SqliteConnection,
    today: NaiveDate,
) -> Result<HasilSweep, diesel::result::Error> {
    use crate::schema::karyawan::dsl::*;

    let horizon = today + Duration::days(HORIZON_TINDAK_LANJUT_HARI);

    conn.transaction(|conn| {
        let dinonaktifkan = diesel::update(
            karyawan
                .filter(tindak_lanjut_kontrak.eq(TINDAK_LANJUT_TIDAK_DIPERPANJANG))
                .filter(tanggal_akhir_kontrak.lt(today))
                .filter(status.eq(STATUS_AKTIF)),
        )
        .set(status.eq(STATUS_NONAKTIF))
        .execute(conn)?;

        let ditandai = diesel::update(
            karyawan
                .filter(tanggal_akhir_kontrak.is_not_null())
                .filter(tanggal_akhir_kontrak.le(horizon))
                .filter(tindak_lanjut_kontrak.eq(TINDAK_LANJUT_TIDAK_PERLU)),
        )
        .set(tindak_lanjut_kontrak.eq(TINDAK_LANJUT_BELUM))
        .execute(conn)?;

        Ok(HasilSweep {
            dinonaktifkan,
            ditandai_tindak_lanjut: ditandai,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Karyawan;
    use crate::orm::karyawan::{get_karyawan, insert_karyawan, update_tindak_lanjut};
    use crate::orm::testing::{contoh_karyawan_input, setup_test_db};

    fn hari(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn refetch(conn: &mut SqliteConnection, id: i32) -> Karyawan {
        get_karyawan(conn, id).unwrap().unwrap()
    }

    #[test]
    fn test_expired_not_renewed_becomes_nonaktif() {
        let mut conn = setup_test_db();
        let today = hari(2025, 6, 1);

        let mut input = contoh_karyawan_input("Budi", "K-001", "111");
        input.tanggal_akhir_kontrak = Some(hari(2025, 5, 1));
        let k = insert_karyawan(&mut conn, input).unwrap();
        update_tindak_lanjut(&mut conn, k.id, TINDAK_LANJUT_TIDAK_DIPERPANJANG).unwrap();

        let hasil = jalankan_sweep(&mut conn, today).unwrap();
        assert_eq!(hasil.dinonaktifkan, 1);
        assert_eq!(refetch(&mut conn, k.id).status, STATUS_NONAKTIF);
    }

    #[test]
    fn test_end_date_today_is_not_expired() {
        let mut conn = setup_test_db();
        let today = hari(2025, 6, 1);

        // Strictly-before comparison: a contract ending today stays active.
        let mut input = contoh_karyawan_input("Budi", "K-001", "111");
        input.tanggal_akhir_kontrak = Some(today);
        let k = insert_karyawan(&mut conn, input).unwrap();
        update_tindak_lanjut(&mut conn, k.id, TINDAK_LANJUT_TIDAK_DIPERPANJANG).unwrap();

        let hasil = jalankan_sweep(&mut conn, today).unwrap();
        assert_eq!(hasil.dinonaktifkan, 0);
        assert_eq!(refetch(&mut conn, k.id).status, STATUS_AKTIF);
    }

    #[test]
    fn test_expiring_contract_flagged_for_follow_up() {
        let mut conn = setup_test_db();
        let today = hari(2025, 6, 1);

        // Exactly on the 90-day boundary: included.
        let mut boundary = contoh_karyawan_input("Budi", "K-001", "111");
        boundary.tanggal_akhir_kontrak = Some(today + Duration::days(90));
        let kb = insert_karyawan(&mut conn, boundary).unwrap();

        // Beyond the horizon: untouched.
        let mut far = contoh_karyawan_input("Siti", "K-002", "222");
        far.tanggal_akhir_kontrak = Some(today + Duration::days(91));
        let kf = insert_karyawan(&mut conn, far).unwrap();

        // No end date: untouched.
        let open = insert_karyawan(&mut conn, contoh_karyawan_input("Joko", "K-003", "333"))
            .unwrap();

        let hasil = jalankan_sweep(&mut conn, today).unwrap();
        assert_eq!(hasil.ditandai_tindak_lanjut, 1);
        assert_eq!(
            refetch(&mut conn, kb.id).tindak_lanjut_kontrak,
            TINDAK_LANJUT_BELUM
        );
        assert_eq!(
            refetch(&mut conn, kf.id).tindak_lanjut_kontrak,
            TINDAK_LANJUT_TIDAK_PERLU
        );
        assert_eq!(
            refetch(&mut conn, open.id).tindak_lanjut_kontrak,
            TINDAK_LANJUT_TIDAK_PERLU
        );
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let mut conn = setup_test_db();
        let today = hari(2025, 6, 1);

        let mut expiring = contoh_karyawan_input("Budi", "K-001", "111");
        expiring.tanggal_akhir_kontrak = Some(today + Duration::days(30));
        insert_karyawan(&mut conn, expiring).unwrap();

        let mut expired = contoh_karyawan_input("Siti", "K-002", "222");
        expired.tanggal_akhir_kontrak = Some(hari(2025, 1, 1));
        let k = insert_karyawan(&mut conn, expired).unwrap();
        update_tindak_lanjut(&mut conn, k.id, TINDAK_LANJUT_TIDAK_DIPERPANJANG).unwrap();

        let first = jalankan_sweep(&mut conn, today).unwrap();
        assert_eq!(first.dinonaktifkan, 1);
        assert_eq!(first.ditandai_tindak_lanjut, 1);

        let second = jalankan_sweep(&mut conn, today).unwrap();
        assert_eq!(second, HasilSweep::default());
    }

    #[test]
    fn test_manual_follow_up_state_is_preserved() {
        let mut conn = setup_test_db();
        let today = hari(2025, 6, 1);

        // HR already confirmed with the branch; the sweep must not regress it.
        let mut input = contoh_karyawan_input("Budi", "K-001", "111");
        input.tanggal_akhir_kontrak = Some(today + Duration::days(10));
        let k = insert_karyawan(&mut conn, input).unwrap();
        update_tindak_lanjut(
            &mut conn,
            k.id,
            "Telah dikonfirmasi ke cabang/unit kerja",
        )
        .unwrap();

        let hasil = jalankan_sweep(&mut conn, today).unwrap();
        assert_eq!(hasil.ditandai_tindak_lanjut, 0);
        assert_eq!(
            refetch(&mut conn, k.id).tindak_lanjut_kontrak,
            "Telah dikonfirmasi ke cabang/unit kerja"
        );
    }
}
