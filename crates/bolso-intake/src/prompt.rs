// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extraction prompt assembly.

use bolso_core::types::{MediaPayload, PromptPart, ProviderRequest};

/// Task description sent ahead of every user input.
pub const EXTRACTION_PROMPT: &str = r#"Você é um assistente financeiro especializado em extrair informações de transações financeiras.

Analise a entrada do usuário (texto, transcrição de áudio ou descrição de imagem) e extraia as transações financeiras mencionadas.

CATEGORIAS DE DESPESA (use exatamente estes valores):
- fixed_housing: Moradia (aluguel, condomínio, IPTU)
- fixed_utilities: Contas (luz, água, gás, internet)
- fixed_subscriptions: Assinaturas (streaming, apps, academia)
- fixed_personal: Pessoal fixo (plano de saúde, seguro)
- fixed_taxes: Impostos e taxas
- variable_credit: Cartão de crédito
- variable_food: Alimentação (mercado, restaurante, delivery)
- variable_transport: Transporte (uber, combustível, estacionamento)
- variable_other: Outros gastos variáveis

TIPOS:
- income: Receita/entrada de dinheiro
- expense: Despesa/saída de dinheiro

REGRAS:
1. Extraia valor, descrição e tipo de cada transação
2. Se for despesa, tente identificar a categoria mais apropriada
3. Se não conseguir identificar a categoria, use null
4. Valores devem ser números positivos (sem sinal de menos)
5. Se a entrada mencionar múltiplas transações, extraia todas
6. Se não conseguir extrair nenhuma transação válida, retorne array vazio

EXEMPLOS DE ENTRADA E SAÍDA:

Entrada: "gastei 50 no uber"
Saída: {"transactions": [{"description": "Uber", "amount": 50, "type": "expense", "category": "variable_transport"}], "confidence": 0.95}

Entrada: "recebi 5000 de salário"
Saída: {"transactions": [{"description": "Salário", "amount": 5000, "type": "income", "category": null}], "confidence": 0.98}

Entrada: "paguei 150 de luz e 80 de internet"
Saída: {"transactions": [{"description": "Conta de luz", "amount": 150, "type": "expense", "category": "fixed_utilities"}, {"description": "Internet", "amount": 80, "type": "expense", "category": "fixed_utilities"}], "confidence": 0.92}

Entrada: "almocei no restaurante por 45 reais"
Saída: {"transactions": [{"description": "Almoço restaurante", "amount": 45, "type": "expense", "category": "variable_food"}], "confidence": 0.90}

Retorne APENAS o JSON, sem explicações ou texto adicional.

{
  "transactions": [
    {
      "description": "string",
      "amount": number,
      "type": "income" | "expense",
      "category": "categoria" | null
    }
  ],
  "confidence": 0.0-1.0
}"#;

const AUDIO_INSTRUCTION: &str = "\n\nTranscreva o áudio acima e extraia as transações mencionadas.";
const IMAGE_INSTRUCTION: &str =
    "\n\nAnalise a imagem acima (cupom fiscal, comprovante, etc) e extraia as transações.";

/// Build the provider request for one message.
///
/// Order: task description, user text, media bytes, then a media-kind
/// instruction chosen by MIME type.
pub fn build_request(text: Option<&str>, media: Option<&MediaPayload>) -> ProviderRequest {
    let mut parts = vec![PromptPart::Text(EXTRACTION_PROMPT.to_string())];

    if let Some(text) = text.filter(|t| !t.is_empty()) {
        parts.push(PromptPart::Text(format!("\n\nEntrada do usuário: {text}")));
    }

    if let Some(media) = media {
        parts.push(PromptPart::InlineData {
            mime_type: media.mime_type.clone(),
            data: media.bytes.clone(),
        });
        if media.mime_type.starts_with("audio/") {
            parts.push(PromptPart::Text(AUDIO_INSTRUCTION.to_string()));
        } else if media.mime_type.starts_with("image/") {
            parts.push(PromptPart::Text(IMAGE_INSTRUCTION.to_string()));
        }
    }

    ProviderRequest { parts }
}
