use chrono::NaiveDate;
use diesel::{Identifiable, Insertable, Queryable, QueryableByName};
use serde::{Deserialize, Serialize};

use crate::format::{format_rupiah, format_tanggal};
use crate::schema::karyawan;

/// Employment status values stored in `karyawan.status`.
pub const STATUS_AKTIF: &str = "Aktif";
pub const STATUS_NONAKTIF: &str = "Nonaktif";

/// Renewal follow-up workflow states, in the order shown to HR staff.
pub const STATUS_TINDAK_LANJUT_OPTIONS: [&str; 5] = [
    "Tidak perlu",
    "Belum ditindaklanjuti",
    "Telah dikonfirmasi ke cabang/unit kerja",
    "Dalam proses perpanjangan kontrak",
    "Tidak diperpanjang",
];

pub const TINDAK_LANJUT_TIDAK_PERLU: &str = "Tidak perlu";
pub const TINDAK_LANJUT_BELUM: &str = "Belum ditindaklanjuti";
pub const TINDAK_LANJUT_TIDAK_DIPERPANJANG: &str = "Tidak diperpanjang";

/// A contract employee (PKWT) record.
#[derive(Deserialize, Queryable, Identifiable, QueryableByName, Debug, Clone, Serialize)]
#[diesel(table_name = karyawan)]
pub struct Karyawan {
    pub id: i32,
    pub nama: String,
    pub jenis_kelamin: String,
    pub nup: String, // Will be unique
    pub tempat_lahir: String,
    pub tanggal_lahir: NaiveDate,
    pub nik: String, // Will be unique
    pub alamat: Option<String>,
    pub no_hp: Option<String>,
    pub jabatan: Option<String>,
    pub unit_kerja: Option<String>,
    pub email: Option<String>,
    pub tanggal_mulai: NaiveDate,
    pub tanggal_akhir_kontrak: Option<NaiveDate>,
    pub gaji_honorarium: Option<i32>,
    pub tunjangan_tetap: Option<i32>,
    pub status: String,
    pub tindak_lanjut_kontrak: String,
}

impl Karyawan {
    /// Remaining contract days counted from `today`, floored at zero.
    /// `None` when the contract has no end date.
    pub fn sisa_kontrak(&self, today: NaiveDate) -> Option<i64> {
        self.tanggal_akhir_kontrak
            .map(|akhir| (akhir - today).num_days().max(0))
    }
}

#[derive(Insertable, Deserialize)]
#[diesel(table_name = karyawan)]
pub struct NewKaryawan {
    pub nama: String,
    pub jenis_kelamin: String,
    pub nup: String,
    pub tempat_lahir: String,
    pub tanggal_lahir: NaiveDate,
    pub nik: String,
    pub alamat: Option<String>,
    pub no_hp: Option<String>,
    pub jabatan: Option<String>,
    pub unit_kerja: Option<String>,
    pub email: Option<String>,
    pub tanggal_mulai: NaiveDate,
    pub tanggal_akhir_kontrak: Option<NaiveDate>,
    pub gaji_honorarium: Option<i32>,
    pub tunjangan_tetap: Option<i32>,
    pub status: String,
    pub tindak_lanjut_kontrak: String,
}

/// Validated input for creating or updating an employee. Built at the route
/// boundary from the submitted form, after date parsing has succeeded.
#[derive(Debug, Clone)]
pub struct KaryawanInput {
    pub nama: String,
    pub jenis_kelamin: String,
    pub nup: String,
    pub tempat_lahir: String,
    pub tanggal_lahir: NaiveDate,
    pub nik: String,
    pub alamat: Option<String>,
    pub no_hp: Option<String>,
    pub jabatan: Option<String>,
    pub unit_kerja: Option<String>,
    pub email: Option<String>,
    pub tanggal_mulai: NaiveDate,
    pub tanggal_akhir_kontrak: Option<NaiveDate>,
    pub gaji_honorarium: Option<i32>,
    pub tunjangan_tetap: Option<i32>,
    pub status: String,
}

/// Filters accepted by the dashboard employee listing.
#[derive(Debug, Default, Clone)]
pub struct FilterKaryawan {
    pub search: Option<String>,
    pub unit_kerja: Option<String>,
    pub gaji_min: Option<i32>,
    pub gaji_max: Option<i32>,
}

/// Row shape handed to the list/dashboard templates: raw fields the pages
/// sort on plus pre-formatted display strings.
#[derive(Debug, Serialize)]
pub struct TampilanKaryawan {
    pub id: i32,
    pub nama: String,
    pub nup: String,
    pub jabatan: Option<String>,
    pub unit_kerja: Option<String>,
    pub status: String,
    pub tindak_lanjut_kontrak: String,
    pub tanggal_akhir_kontrak: String,
    pub sisa_kontrak: Option<i64>,
    pub gaji: String,
}

impl TampilanKaryawan {
    pub fn dari(k: &Karyawan, today: NaiveDate) -> Self {
        TampilanKaryawan {
            id: k.id,
            nama: k.nama.clone(),
            nup: k.nup.clone(),
            jabatan: k.jabatan.clone(),
            unit_kerja: k.unit_kerja.clone(),
            status: k.status.clone(),
            tindak_lanjut_kontrak: k.tindak_lanjut_kontrak.clone(),
            tanggal_akhir_kontrak: format_tanggal(k.tanggal_akhir_kontrak),
            sisa_kontrak: k.sisa_kontrak(today),
            gaji: format_rupiah(k.gaji_honorarium.map(i64::from)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy(akhir: Option<NaiveDate>) -> Karyawan {
        Karyawan {
            id: 1,
            nama: "Budi Santoso".to_string(),
            jenis_kelamin: "Laki-laki".to_string(),
            nup: "K-001".to_string(),
            tempat_lahir: "Surabaya".to_string(),
            tanggal_lahir: NaiveDate::from_ymd_opt(1990, 5, 1).unwrap(),
            nik: "3171010101900001".to_string(),
            alamat: None,
            no_hp: None,
            jabatan: None,
            unit_kerja: None,
            email: None,
            tanggal_mulai: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            tanggal_akhir_kontrak: akhir,
            gaji_honorarium: None,
            tunjangan_tetap: None,
            status: STATUS_AKTIF.to_string(),
            tindak_lanjut_kontrak: TINDAK_LANJUT_TIDAK_PERLU.to_string(),
        }
    }

    #[test]
    fn test_sisa_kontrak_future_end_date() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let k = dummy(NaiveDate::from_ymd_opt(2025, 1, 31));
        assert_eq!(k.sisa_kontrak(today), Some(30));
    }

    #[test]
    fn test_sisa_kontrak_expired_is_zero() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let k = dummy(NaiveDate::from_ymd_opt(2025, 1, 31));
        assert_eq!(k.sisa_kontrak(today), Some(0));
    }

    #[test]
    fn test_sisa_kontrak_without_end_date() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(dummy(None).sisa_kontrak(today), None);
    }
}
