/// Largest archive the email provider accepts (25 MiB)
pub const MAX_EMAIL_SIZE: usize = 25 * 1024 * 1024;

/// Organization line printed above the report title
pub const DEFAULT_ORGANIZATION: &str = "INSPETORES GCM ATALAIA - AL";

/// Printed wherever a field has no value
pub const PLACEHOLDER: &str = "-";

// =============================================================================
// USER-FACING MESSAGES
// =============================================================================

pub const MSG_REPORT_SENT: &str = "Relatório enviado por e-mail com sucesso!";

pub const MSG_ARCHIVE_TOO_LARGE: &str =
    "Arquivo muito grande para envio por e-mail. Reduza a quantidade ou o tamanho das fotos e vídeos.";
