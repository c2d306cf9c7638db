// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing reply texts (Portuguese) and their formatting helpers.

use bolso_core::types::{CandidateTransaction, TransactionKind};

/// Sent after a verification code links the sender.
pub const WELCOME: &str = "✅ WhatsApp vinculado com sucesso!\n\nAgora você pode enviar suas transações por aqui. Exemplos:\n\n• \"gastei 50 no uber\"\n• \"recebi 3000 de salário\"\n• \"almocei 35 reais\"\n\nTambém aceito áudios e fotos de comprovantes!";

pub const INVALID_CODE: &str = "❌ Código de verificação inválido ou expirado.\n\nAcesse o app Meu Bolso em Configurações > WhatsApp para gerar um novo código.";

/// Unregistered sender wrote a text that is not a code.
pub const ONBOARDING_TEXT: &str = "👋 Olá! Para usar o Meu Bolso via WhatsApp, primeiro você precisa vincular seu número.\n\n1. Acesse o app Meu Bolso\n2. Vá em Configurações > WhatsApp\n3. Gere um código de verificação\n4. Envie o código aqui\n\nSe já tem um código, envie ele agora!";

/// Unregistered sender sent media or an empty message.
pub const ONBOARDING_MEDIA: &str = "👋 Para usar o Meu Bolso via WhatsApp, vincule seu número primeiro.\n\nAcesse o app > Configurações > WhatsApp e envie o código de verificação aqui.";

pub const UNSUPPORTED: &str = "Desculpe, só consigo processar mensagens de texto, áudio ou imagem.";

pub const NOTHING_EXTRACTED: &str = "Não consegui identificar nenhuma transação na sua mensagem. Tente algo como 'gastei 50 no uber' ou 'recebi 3000 de salário'.";

/// Every insert of a non-empty batch failed.
pub const PERSISTENCE_FAILED: &str =
    "❌ Não consegui salvar suas transações agora. Tente novamente em alguns minutos.";

/// Upgrade prompt for a sender whose monthly quota is exhausted.
pub fn limit_reached(limit: u32, upgrade_url: &str) -> String {
    format!(
        "⚠️ Você atingiu o limite de {limit} mensagens do seu plano este mês.\n\nFaça upgrade para continuar registrando pelo WhatsApp: {upgrade_url}"
    )
}

/// Format `amount` as Brazilian reais: `R$ 1.234,56`.
pub fn format_brl(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let units = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, digit) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    format!("{sign}R$ {grouped},{frac:02}")
}

/// One confirmation line: `💸 Uber: R$ 50,00`.
pub fn transaction_line(tx: &CandidateTransaction) -> String {
    let emoji = match tx.kind {
        TransactionKind::Income => "💰",
        TransactionKind::Expense => "💸",
    };
    format!("{emoji} {}: {}", tx.description, format_brl(tx.amount))
}

/// Confirmation for stored lines. `None` when nothing was stored.
pub fn confirmation(lines: &[String]) -> Option<String> {
    match lines.len() {
        0 => None,
        1 => Some(format!("✅ Transação registrada!\n\n{}", lines[0])),
        n => Some(format!(
            "✅ {n} transações registradas!\n\n{}",
            lines.join("\n")
        )),
    }
}

/// Remaining-count warning suffix.
pub fn remaining_warning(remaining: u32) -> String {
    if remaining == 1 {
        "\n\n⚠️ Você tem 1 mensagem restante este mês.".to_string()
    } else {
        format!("\n\n⚠️ Você tem {remaining} mensagens restantes este mês.")
    }
}

/// Upgrade call-to-action suffix.
pub fn upgrade_cta(upgrade_url: &str) -> String {
    format!("\nFaça upgrade para continuar usando: {upgrade_url}")
}
