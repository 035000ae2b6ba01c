use diesel::{Identifiable, Insertable, Queryable};
use serde::Serialize;

use crate::schema::template_kontrak;

/// A named contract template file. Names are unique.
#[derive(Queryable, Identifiable, Debug, Clone, Serialize)]
#[diesel(table_name = template_kontrak)]
pub struct TemplateKontrak {
    pub id: i32,
    pub nama_template: String,
    pub file_path: String,
}

#[derive(Insertable)]
#[diesel(table_name = template_kontrak)]
pub struct NewTemplateKontrak {
    pub nama_template: String,
    pub file_path: String,
}
