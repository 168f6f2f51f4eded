//! Reference data shipped with the application.

/// Brazilian federative units as `(code, name)`.
pub const BRAZILIAN_STATES: &[(&str, &str)] = &[
    ("AC", "Acre"),
    ("AL", "Alagoas"),
    ("AP", "Amapá"),
    ("AM", "Amazonas"),
    ("BA", "Bahia"),
    ("CE", "Ceará"),
    ("DF", "Distrito Federal"),
    ("ES", "Espírito Santo"),
    ("GO", "Goiás"),
    ("MA", "Maranhão"),
    ("MT", "Mato Grosso"),
    ("MS", "Mato Grosso do Sul"),
    ("MG", "Minas Gerais"),
    ("PA", "Pará"),
    ("PB", "Paraíba"),
    ("PR", "Paraná"),
    ("PE", "Pernambuco"),
    ("PI", "Piauí"),
    ("RJ", "Rio de Janeiro"),
    ("RN", "Rio Grande do Norte"),
    ("RS", "Rio Grande do Sul"),
    ("RO", "Rondônia"),
    ("RR", "Roraima"),
    ("SC", "Santa Catarina"),
    ("SP", "São Paulo"),
    ("SE", "Sergipe"),
    ("TO", "Tocantins"),
];

#[must_use]
pub fn is_brazilian_state(code: &str) -> bool {
    BRAZILIAN_STATES.iter().any(|(known, _)| *known == code)
}

/// Short month labels, January first.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Label for a 1-based month number.
#[must_use]
pub fn month_label(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|index| MONTH_LABELS.get(index as usize))
        .copied()
        .unwrap_or("")
}

/// Hive box designs known to Brazilian meliponiculture, `(name, description)`.
pub const BOX_MODELS: &[(&str, &str)] = &[
    (
        "INPA",
        "(Fernando Oliveira) – Modular vertical (ninho, sobreninho, melgueiras). É o padrão mais difundido no Brasil pela facilidade de manejo, divisão e coleta de mel. Dimensões variam por espécie (ex.: jataí, mandaçaia, uruçu etc.).",
    ),
    (
        "PNN",
        "(Paulo Nogueira-Neto) – Horizontal com “gavetas”; muito usado para jataí e mandaçaias. Facilita acessar crias, mas não é o melhor para extrair mel em grande volume.",
    ),
    (
        "SH",
        "Pensada para espécies que fazem crias em “cachos” (Frieseomelitta, Leurotrigona/“lambe-olhos” etc.) e para facilitar divisões, com compartimentos horizontais e visores.",
    ),
    (
        "Moreira (USP)",
        "Muito usada para Frieseomelitta varia (“marmelada”), focada em eficiência de divisão e manejo dessas espécies de crias em cachos.",
    ),
    (
        "JCW",
        "Variação modular com melgueiras laterais (existe versão em “T”). Útil em cenários específicos, mas exige mais tampas/isolamentos.",
    ),
    (
        "AF",
        "(Ailton Fontana) – Módulos “encaixados” num gabinete externo (tipo gaveteiro). Bom isolamento, porém construção/manutenção mais complexas e propolização pode atrapalhar.",
    ),
    (
        "Novy",
        "(circular, concreto celular/argamassa) – Alta inércia térmica/acústica; pavimentos circulares com alturas adequadas aos potes de alimento. Interessante para controle térmico.",
    ),
    (
        "Didática (com visores)",
        "Foco educativo/observação; pode servir para manejo leve.",
    ),
    (
        "Cacuí (família Schwade)",
        "Adaptação vertical inspirada no INPA, criada na Amazônia (reservas Amanã/Mamirauá).",
    ),
    (
        "Kerr",
        "Modelo menos comum inspirado nos estudos de Warwick Kerr, com variações regionais de uso.",
    ),
    (
        "Capel",
        "Modelo que possui versões horizontal e vertical, utilizado em nichos específicos e adaptações regionais.",
    ),
    (
        "Baiano",
        "Variação regional focada em facilidade de construção e materiais simples.",
    ),
    (
        "Isis",
        "Modelo empregado por criadores que buscam modularidade intermediária e bom isolamento.",
    ),
    (
        "Maria",
        "Projeto voltado para pequenos espaços, priorizando visualização da postura e organização interna.",
    ),
    (
        "Juliane",
        "Modelo colaborativo desenvolvido por criadores da região Sul, com foco em divisões rápidas.",
    ),
];

/// A season boundary in the southern hemisphere calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonSpan {
    pub name: &'static str,
    pub start_month: u8,
    pub start_day: u8,
    pub end_month: u8,
    pub end_day: u8,
}

pub const SEASONS: &[SeasonSpan] = &[
    SeasonSpan {
        name: "Outono",
        start_month: 3,
        start_day: 20,
        end_month: 6,
        end_day: 20,
    },
    SeasonSpan {
        name: "Inverno",
        start_month: 6,
        start_day: 20,
        end_month: 9,
        end_day: 22,
    },
    SeasonSpan {
        name: "Primavera",
        start_month: 9,
        start_day: 22,
        end_month: 12,
        end_day: 21,
    },
    SeasonSpan {
        name: "Verão",
        start_month: 12,
        start_day: 21,
        end_month: 3,
        end_day: 20,
    },
];
